//! Flat key/value configuration store.
//!
//! Keys form a `/` separated hierarchy such as
//! `Database/ATID/SQLite/DatabaseName`. The store only reads values; how they
//! are persisted belongs to the host application.

use std::collections::BTreeMap;
use std::path::Path;

use crate::driver::Engine;
use crate::error::ConfigError;

/// Key names used by the catalog layer.
pub mod keys {
    use crate::driver::Engine;

    pub const HOST_NAME: &str = "HostName";
    pub const PORT: &str = "Port";
    pub const DATABASE_NAME: &str = "DatabaseName";
    pub const USER_NAME: &str = "UserName";
    pub const PASSWORD: &str = "Password";
    pub const DATA_SOURCE_NAME: &str = "DataSourceName";

    /// `Database/<slot>/Enabled`
    pub fn enabled(slot: &str) -> String {
        format!("Database/{slot}/Enabled")
    }

    /// `Database/<slot>/Engine`
    pub fn engine(slot: &str) -> String {
        format!("Database/{slot}/Engine")
    }

    /// `Database/<slot>/PreferRemote`
    pub fn prefer_remote(slot: &str) -> String {
        format!("Database/{slot}/PreferRemote")
    }

    /// `Database/<slot>/<Engine>/<param>`
    pub fn engine_param(slot: &str, engine: Engine, param: &str) -> String {
        format!("Database/{slot}/{engine}/{param}")
    }

    pub const REMOTE_ENDPOINT: &str = "Remote/SIMBAD/Endpoint";
    pub const REMOTE_TIMEOUT_SECONDS: &str = "Remote/SIMBAD/TimeoutSeconds";
}

/// Flat key/value settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Load(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses settings from TOML.
    ///
    /// Nested tables flatten into the key hierarchy, so
    /// `[Database.ATID] Engine = "SQLite"` yields `Database/ATID/Engine`.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml_str
            .parse()
            .map_err(|e: toml::de::Error| ConfigError::Load(e.to_string()))?;
        let mut settings = Self::new();
        flatten_into(&mut settings.values, String::new(), &table);
        Ok(settings)
    }

    /// Sets a value, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw string value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// String value that must be present.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingValue {
            key: key.to_string(),
        })
    }

    /// Boolean value; accepts `true/false`, `yes/no`, `on/off` and `1/0`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(invalid(key, raw)),
        }
    }

    /// Parses a value with `FromStr`.
    pub fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| invalid(key, raw)),
        }
    }

    /// Engine selected for a catalog slot.
    pub fn engine(&self, slot: &str) -> Result<Engine, ConfigError> {
        self.require(&keys::engine(slot))?.parse()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: String, table: &toml::Table) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten_into(out, key, inner),
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            other => {
                out.insert(key, other.to_string());
            }
        }
    }
}
