//! Per-catalog connection manager.
//!
//! A [`CatalogConnection`] owns at most one driver connection for one catalog
//! slot. Connecting never returns an error: failures are logged and leave the
//! catalog `Disabled` or `Failed`, which callers check before querying.

use std::fmt;
use std::sync::Arc;

use crate::config::{keys, Settings};
use crate::driver::{
    ConnectShape, ConnectTarget, Driver, DriverConnection, DriverRegistry, Engine, NameKind,
    NetworkParams, Row,
};
use crate::error::{ConfigError, ConnectionError};
use crate::query::Statement;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Unopened,
    Open,
    Disabled,
    Failed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unopened => "unopened",
            Self::Open => "open",
            Self::Disabled => "disabled",
            Self::Failed => "failed",
        })
    }
}

enum State {
    Unopened,
    Open {
        engine: Engine,
        handle: Box<dyn DriverConnection>,
    },
    Disabled,
    Failed,
}

/// Connection owned by one catalog slot.
pub struct CatalogConnection {
    slot: String,
    registry: Arc<DriverRegistry>,
    settings: Arc<Settings>,
    state: State,
}

type ConnectRoutine = fn(&CatalogConnection, &dyn Driver, Engine) -> Result<ConnectTarget, ConfigError>;

/// Parameter routine per engine: three engines share the network shape,
/// SQLite and ODBC share the single-name shape.
fn connect_routine(engine: Engine) -> ConnectRoutine {
    match engine.connect_shape() {
        ConnectShape::Network => CatalogConnection::network_target,
        ConnectShape::Named(_) => CatalogConnection::named_target,
    }
}

impl CatalogConnection {
    /// Creates an unopened connection for `slot` (e.g. `"ATID"`).
    pub fn new(slot: impl Into<String>, registry: Arc<DriverRegistry>, settings: Arc<Settings>) -> Self {
        Self {
            slot: slot.into(),
            registry,
            settings,
            state: State::Unopened,
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn status(&self) -> ConnectionStatus {
        match self.state {
            State::Unopened => ConnectionStatus::Unopened,
            State::Open { .. } => ConnectionStatus::Open,
            State::Disabled => ConnectionStatus::Disabled,
            State::Failed => ConnectionStatus::Failed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    /// Engine of the open connection.
    pub fn engine(&self) -> Option<Engine> {
        match self.state {
            State::Open { engine, .. } => Some(engine),
            _ => None,
        }
    }

    /// Connects using the engine configured for this slot.
    pub fn connect_configured(&mut self) -> bool {
        match self.settings.engine(&self.slot) {
            Ok(engine) => self.connect_engine(engine),
            Err(e) => {
                tracing::warn!("Catalog {}: {}; catalog disabled", self.slot, e);
                self.disable();
                false
            }
        }
    }

    /// Connects using the engine named by `engine_name`.
    ///
    /// Returns `false` when the name is unknown, the driver is unavailable,
    /// parameters are missing or the driver fails to connect.
    pub fn connect(&mut self, engine_name: &str) -> bool {
        match engine_name.parse::<Engine>() {
            Ok(engine) => self.connect_engine(engine),
            Err(e) => {
                tracing::warn!("Catalog {}: {}; catalog disabled", self.slot, e);
                self.disable();
                false
            }
        }
    }

    /// Connects to a specific engine.
    pub fn connect_engine(&mut self, engine: Engine) -> bool {
        self.release();

        let Some(driver) = self.registry.driver(engine) else {
            tracing::warn!(
                "Catalog {}: {} driver not available; catalog disabled",
                self.slot,
                engine
            );
            self.state = State::Disabled;
            return false;
        };

        let target = match connect_routine(engine)(self, driver.as_ref(), engine) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Catalog {}: {}; catalog disabled", self.slot, e);
                self.state = State::Disabled;
                return false;
            }
        };

        match driver.open(&target) {
            Ok(handle) => {
                tracing::info!(
                    "Catalog {}: connected to {} database via {}",
                    self.slot,
                    engine,
                    driver.handle_name()
                );
                self.state = State::Open { engine, handle };
                true
            }
            Err(e) => {
                tracing::error!(
                    "Catalog {}: unable to connect to {} database. Error code: {}. Driver text: {}. Database text: {}",
                    self.slot,
                    engine,
                    e.native_code,
                    e.driver_text,
                    e.database_text
                );
                self.state = State::Failed;
                false
            }
        }
    }

    /// Builds network parameters from `Database/<slot>/<engine>/...`.
    fn network_target(
        &self,
        driver: &dyn Driver,
        engine: Engine,
    ) -> Result<ConnectTarget, ConfigError> {
        let key = |param: &str| keys::engine_param(&self.slot, engine, param);
        let port = match self.settings.get_parsed::<u16>(&key(keys::PORT))? {
            Some(port) => port,
            None => engine.default_port().ok_or_else(|| ConfigError::MissingValue {
                key: key(keys::PORT),
            })?,
        };
        let params = NetworkParams {
            host: self.settings.require(&key(keys::HOST_NAME))?.to_string(),
            port,
            database: self.settings.require(&key(keys::DATABASE_NAME))?.to_string(),
            user: self.settings.get(&key(keys::USER_NAME)).unwrap_or_default().to_string(),
            password: self.settings.get(&key(keys::PASSWORD)).unwrap_or_default().to_string(),
        };
        tracing::debug!(
            "Catalog {}: {} target {}@{}:{}/{}",
            self.slot,
            driver.handle_name(),
            params.user,
            params.host,
            params.port,
            params.database
        );
        Ok(ConnectTarget::Network(params))
    }

    /// Reads the database file path (SQLite) or data-source name (ODBC).
    fn named_target(
        &self,
        driver: &dyn Driver,
        engine: Engine,
    ) -> Result<ConnectTarget, ConfigError> {
        let param = match engine.connect_shape() {
            ConnectShape::Named(NameKind::DataSource) => keys::DATA_SOURCE_NAME,
            _ => keys::DATABASE_NAME,
        };
        let name = self
            .settings
            .require(&keys::engine_param(&self.slot, engine, param))?;
        tracing::debug!(
            "Catalog {}: {} target {}",
            self.slot,
            driver.handle_name(),
            name
        );
        Ok(ConnectTarget::Named(name.to_string()))
    }

    /// Marks the catalog as not to be used, releasing any open handle.
    pub fn disable(&mut self) {
        self.release();
        self.state = State::Disabled;
    }

    /// Runs a query on the open connection.
    pub fn query(&mut self, statement: &Statement) -> Result<Vec<Row>, ConnectionError> {
        let handle = self.handle()?;
        tracing::debug!("query: {}", statement.sql);
        Ok(handle.query(&statement.sql, &statement.params)?)
    }

    /// Runs a statement that does not return rows.
    pub fn execute(&mut self, statement: &Statement) -> Result<u64, ConnectionError> {
        let handle = self.handle()?;
        tracing::debug!("execute: {}", statement.sql);
        Ok(handle.execute(&statement.sql, &statement.params)?)
    }

    /// Releases an open connection; the catalog returns to `Unopened`.
    pub fn close(&mut self) {
        self.release();
    }

    fn handle(&mut self) -> Result<&mut Box<dyn DriverConnection>, ConnectionError> {
        match &mut self.state {
            State::Open { handle, .. } => Ok(handle),
            _ => Err(ConnectionError::NotOpen {
                slot: self.slot.clone(),
            }),
        }
    }

    fn release(&mut self) {
        match std::mem::replace(&mut self.state, State::Unopened) {
            State::Open { engine, handle } => match handle.close() {
                Ok(()) => tracing::debug!("Catalog {}: {} connection closed", self.slot, engine),
                Err(e) => tracing::warn!(
                    "Catalog {}: error closing {} connection: {}",
                    self.slot,
                    engine,
                    e
                ),
            },
            other => self.state = other,
        }
    }
}

impl Drop for CatalogConnection {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CatalogConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConnection")
            .field("slot", &self.slot)
            .field("status", &self.status())
            .field("engine", &self.engine())
            .finish()
    }
}
