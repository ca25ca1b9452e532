//! Catalog error types.

use thiserror::Error;

use crate::driver::Engine;

/// Error reported by an engine driver.
///
/// Keeps the native error code together with the driver-level and
/// database-level texts so a failed connect can be logged in full.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{native_code}] {driver_text}: {database_text}")]
pub struct DriverError {
    /// Engine specific error code (SQLSTATE, errno, ORA code...)
    pub native_code: String,
    /// Text produced by the client library
    pub driver_text: String,
    /// Text produced by the database server, when one was reached
    pub database_text: String,
}

impl DriverError {
    /// Creates a driver error from its three parts.
    pub fn new(
        native_code: impl Into<String>,
        driver_text: impl Into<String>,
        database_text: impl Into<String>,
    ) -> Self {
        Self {
            native_code: native_code.into(),
            driver_text: driver_text.into(),
            database_text: database_text.into(),
        }
    }

    /// Error raised by the client library without a server-side message.
    pub fn client(driver_text: impl Into<String>) -> Self {
        Self::new("", driver_text, "")
    }
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Engine selection string did not name a known engine
    #[error("Unknown database engine '{0}'")]
    UnknownEngine(String),

    /// Required key is absent
    #[error("Missing configuration value '{key}'")]
    MissingValue { key: String },

    /// Value could not be interpreted
    #[error("Invalid configuration value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Query construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Table was never registered with the builder
    #[error("Table '{0}' is not registered")]
    UnknownTable(String),

    /// Column was never registered for its table
    #[error("Column '{column}' is not registered for table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Statement has no column list
    #[error("SELECT has no columns")]
    NoColumns,

    /// Statement has no FROM table
    #[error("SELECT has no FROM table")]
    NoTable,

    /// Predicate group without members
    #[error("Empty predicate group")]
    EmptyGroup,
}

/// Errors returned by a catalog connection once it is asked to do work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Connection is not open (never connected, disabled or failed)
    #[error("Catalog '{slot}' is not open")]
    NotOpen { slot: String },

    /// Engine is not registered with the driver registry
    #[error("Driver for {0} is not available")]
    DriverUnavailable(Engine),

    /// Statement could not be built
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Driver reported an error
    #[error(transparent)]
    Driver(#[from] DriverError),
}
