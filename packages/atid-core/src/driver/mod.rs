//! Database engine drivers and the registry of drivers usable on this host.
//!
//! Every engine is reached through the same two traits: [`Driver`] opens a
//! connection and [`DriverConnection`] runs statements on it. Engines differ
//! only in how the connection target is described, which [`ConnectTarget`]
//! captures in two shapes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DriverError};

#[cfg(any(feature = "odbc", test))]
mod confined;
#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "odbc")]
mod odbc;
#[cfg(feature = "oracle")]
mod oracle;
#[cfg(feature = "postgres")]
mod postgres;
mod registry;
#[cfg(feature = "sqlite")]
mod sqlite;
mod value;

#[cfg(feature = "mysql")]
pub use self::mysql::MySqlDriver;
#[cfg(feature = "odbc")]
pub use self::odbc::OdbcDriver;
#[cfg(feature = "oracle")]
pub use self::oracle::OracleDriver;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresDriver;
pub use registry::{DriverDescriptor, DriverRegistry};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
pub use value::{Row, SqlValue};

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Engine {
    MySql,
    Oracle,
    Sqlite,
    PostgreSql,
    Odbc,
}

impl Engine {
    pub const ALL: [Engine; 5] = [
        Engine::MySql,
        Engine::Oracle,
        Engine::Sqlite,
        Engine::PostgreSql,
        Engine::Odbc,
    ];

    /// Name used in configuration keys and selection strings.
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Oracle => "Oracle",
            Self::Sqlite => "SQLite",
            Self::PostgreSql => "PostgreSQL",
            Self::Odbc => "ODBC",
        }
    }

    /// How a connection target is described for this engine.
    pub const fn connect_shape(self) -> ConnectShape {
        match self {
            Self::MySql | Self::Oracle | Self::PostgreSql => ConnectShape::Network,
            Self::Sqlite => ConnectShape::Named(NameKind::FilePath),
            Self::Odbc => ConnectShape::Named(NameKind::DataSource),
        }
    }

    /// Port used when configuration does not name one.
    pub const fn default_port(self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::Oracle => Some(1521),
            Self::PostgreSql => Some(5432),
            Self::Sqlite | Self::Odbc => None,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

impl FromStr for Engine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|engine| engine.config_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownEngine(wanted.to_string()))
    }
}

/// Connection parameter shape of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectShape {
    /// host, port, database, user, password
    Network,
    /// a single name
    Named(NameKind),
}

/// What the single name of a [`ConnectShape::Named`] engine refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    FilePath,
    DataSource,
}

/// Parameters for network engines.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for NetworkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Where a driver should connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    Network(NetworkParams),
    /// SQLite file path or ODBC data-source name
    Named(String),
}

/// An engine driver compiled into this build.
pub trait Driver: Send + Sync {
    /// Engine served by this driver.
    fn engine(&self) -> Engine;

    /// Driver handle name, e.g. `"sqlite3"`.
    fn handle_name(&self) -> &'static str;

    /// Human readable label.
    fn label(&self) -> &'static str;

    /// Checks that the client side of the engine is usable on this host.
    fn probe(&self) -> bool {
        true
    }

    /// Opens a connection.
    fn open(&self, target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError>;
}

/// An open connection. Used by one owner at a time.
pub trait DriverConnection: Send {
    /// Runs a statement returning rows.
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError>;

    /// Runs a statement returning an affected-row count.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError>;

    /// Releases the connection.
    fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// Drivers compiled into this build, in registration order.
pub fn builtin_drivers() -> Vec<Arc<dyn Driver>> {
    #[allow(unused_mut)]
    let mut drivers: Vec<Arc<dyn Driver>> = Vec::new();
    #[cfg(feature = "mysql")]
    drivers.push(Arc::new(MySqlDriver));
    #[cfg(feature = "oracle")]
    drivers.push(Arc::new(OracleDriver));
    #[cfg(feature = "sqlite")]
    drivers.push(Arc::new(SqliteDriver));
    #[cfg(feature = "postgres")]
    drivers.push(Arc::new(PostgresDriver));
    #[cfg(feature = "odbc")]
    drivers.push(Arc::new(OdbcDriver));
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_names_round_trip() {
        for engine in Engine::ALL {
            assert_eq!(engine.config_name().parse::<Engine>().unwrap(), engine);
        }
        assert_eq!("postgresql".parse::<Engine>().unwrap(), Engine::PostgreSql);
        assert_eq!(" MySQL ".parse::<Engine>().unwrap(), Engine::MySql);
        assert!("Sybase".parse::<Engine>().is_err());
    }

    #[test]
    fn test_connect_shapes() {
        assert_eq!(Engine::MySql.connect_shape(), ConnectShape::Network);
        assert_eq!(Engine::Oracle.connect_shape(), ConnectShape::Network);
        assert_eq!(Engine::PostgreSql.connect_shape(), ConnectShape::Network);
        assert_eq!(
            Engine::Sqlite.connect_shape(),
            ConnectShape::Named(NameKind::FilePath)
        );
        assert_eq!(
            Engine::Odbc.connect_shape(),
            ConnectShape::Named(NameKind::DataSource)
        );
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let params = NetworkParams {
            host: "db.example.org".to_string(),
            port: 5432,
            database: "atid".to_string(),
            user: "observer".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{params:?}");
        assert!(rendered.contains("db.example.org"));
        assert!(!rendered.contains("hunter2"));
    }
}
