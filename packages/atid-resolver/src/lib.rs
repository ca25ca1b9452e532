//! Astronomical target resolution over a local relational catalog and a
//! remote name service.
//!
//! [`TargetResolver`] is the entry point. It reads its source preferences
//! once from [`Settings`](atid_core::Settings), owns the local
//! [`LocalCatalog`] connection and the [`RemoteCatalog`](atid_remote::RemoteCatalog)
//! client, and answers name, cone and box queries from whichever source
//! applies.

pub mod config;
pub mod error;
pub mod local;
pub mod resolver;
pub mod schema;

pub use config::ResolverConfig;
pub use error::ResolverError;
pub use local::LocalCatalog;
pub use resolver::{ForceMode, TargetResolver};
