//! Resolver error types.

use thiserror::Error;

use atid_core::error::ConfigError;

/// Errors surfaced by the resolution coordinator.
///
/// Backend trouble never shows up here; it degrades to empty results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// A local lookup was forced but no local catalog was set up
    #[error("Local catalog '{slot}' was not initialised")]
    LocalCatalogUnavailable { slot: String },

    /// Resolver settings could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
