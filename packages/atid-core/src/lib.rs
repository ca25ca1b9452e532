//! Catalog core for the astronomical target resolver.
//!
//! Provides the target data model, coordinate handling, configuration store,
//! engine driver registry, per-catalog connection manager and the
//! parameterized query builder.

pub mod config;
pub mod connection;
pub mod coords;
pub mod driver;
pub mod error;
pub mod query;
pub mod target;

pub use config::Settings;
pub use connection::{CatalogConnection, ConnectionStatus};
pub use coords::{BoxRegion, ConeRegion, CoordinateWindow, SkyCoord};
pub use driver::{DriverRegistry, Engine};
pub use target::{AstronomicalTarget, ReferenceFrame};
