//! Resolver configuration.

use atid_core::config::{keys, Settings};
use atid_core::error::ConfigError;
use atid_remote::RemoteConfig;

/// Slot of the object catalog.
pub const DEFAULT_SLOT: &str = "ATID";

/// Resolver configuration, read once when the resolver is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Catalog slot used for the local catalog
    pub slot: String,
    /// Whether the local catalog is used at all
    pub local_enabled: bool,
    /// Send coordinate queries to the remote service first
    pub prefer_remote: bool,
    /// Remote service settings
    pub remote: RemoteConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SLOT.to_string(),
            local_enabled: true,
            prefer_remote: false,
            remote: RemoteConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Reads `Database/<slot>/Enabled`, `Database/<slot>/PreferRemote` and
    /// the remote service keys. Missing keys keep their defaults.
    pub fn from_settings(settings: &Settings, slot: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            slot: slot.to_string(),
            local_enabled: settings
                .get_bool(&keys::enabled(slot))?
                .unwrap_or(defaults.local_enabled),
            prefer_remote: settings
                .get_bool(&keys::prefer_remote(slot))?
                .unwrap_or(defaults.prefer_remote),
            remote: RemoteConfig::from_settings(settings)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ResolverConfig::from_settings(&Settings::new(), DEFAULT_SLOT).unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_flags_read_from_slot() {
        let settings = Settings::new()
            .with("Database/ARID/Enabled", "no")
            .with("Database/ARID/PreferRemote", "true")
            .with("Database/ATID/PreferRemote", "false");
        let config = ResolverConfig::from_settings(&settings, "ARID").unwrap();
        assert_eq!(config.slot, "ARID");
        assert!(!config.local_enabled);
        assert!(config.prefer_remote);
    }

    #[test]
    fn test_invalid_flag_is_an_error() {
        let settings = Settings::new().with("Database/ATID/Enabled", "maybe");
        assert_eq!(
            ResolverConfig::from_settings(&settings, DEFAULT_SLOT),
            Err(ConfigError::InvalidValue {
                key: "Database/ATID/Enabled".to_string(),
                value: "maybe".to_string(),
            })
        );
    }
}
