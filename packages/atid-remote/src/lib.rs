//! Client for a script-based remote astronomical name service.
//!
//! Builds a three-line query script, sends it as one HTTP GET bounded by a
//! timeout and parses the `;` separated text reply into
//! [`AstronomicalTarget`](atid_core::AstronomicalTarget) records.

pub mod client;
pub mod config;
pub mod error;
pub mod reply;
pub mod script;
pub mod transport;

pub use client::RemoteCatalog;
pub use config::RemoteConfig;
pub use error::{RemoteError, ReplyError};
pub use reply::parse_reply;
pub use script::{Script, ScriptQuery};
pub use transport::{HttpTransport, Transport};
