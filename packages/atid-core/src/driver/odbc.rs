//! ODBC driver backed by `odbc-api`. The connection target is a data-source
//! name registered with the host's driver manager.

use std::sync::{Arc, OnceLock};

use odbc_api::parameter::InputParameter;
use odbc_api::{
    Connection, ConnectionOptions, Cursor, Environment, IntoParameter, Nullable,
    ResultSetMetadata,
};

use super::confined::{ConfinedConnection, Session};
use super::{ConnectTarget, Driver, DriverConnection, Engine, Row, SqlValue};
use crate::error::DriverError;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, odbc_api::Error> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// ODBC engine driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcDriver;

impl Driver for OdbcDriver {
    fn engine(&self) -> Engine {
        Engine::Odbc
    }

    fn handle_name(&self) -> &'static str {
        "odbc"
    }

    fn label(&self) -> &'static str {
        "ODBC driver manager"
    }

    /// Available when the driver manager loads and lists at least one driver.
    fn probe(&self) -> bool {
        let drivers = environment().and_then(|env| env.drivers());
        match drivers {
            Ok(drivers) => {
                for info in &drivers {
                    tracing::debug!("ODBC driver installed: {}", info.description);
                }
                !drivers.is_empty()
            }
            Err(e) => {
                tracing::debug!("ODBC driver manager not usable: {}", e);
                false
            }
        }
    }

    fn open(&self, target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError> {
        let ConnectTarget::Named(dsn) = target else {
            return Err(DriverError::client("ODBC expects a data-source name"));
        };
        let dsn = dsn.clone();
        // odbc-api connections are not `Send`; keep each one on its own thread
        let conn = ConfinedConnection::spawn("odbc", move || {
            let env = environment().map_err(map_error)?;
            let conn = env
                .connect(&dsn, "", "", ConnectionOptions::default())
                .map_err(map_error)?;
            Ok(OdbcSession { conn })
        })?;
        Ok(Box::new(conn))
    }
}

struct OdbcSession {
    conn: Connection<'static>,
}

impl Session for OdbcSession {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        let bound = to_params(params);
        let Some(mut cursor) = self
            .conn
            .execute(sql, bound.as_slice(), None)
            .map_err(map_error)?
        else {
            return Ok(Vec::new());
        };

        let column_count = cursor.num_result_cols().map_err(map_error)?;
        let column_count = u16::try_from(column_count).unwrap_or(0);
        let mut names = Vec::with_capacity(usize::from(column_count));
        for col in 1..=column_count {
            names.push(cursor.col_name(col).map_err(map_error)?);
        }
        let columns: Arc<[String]> = names.into();

        let mut result = Vec::new();
        let mut buf = Vec::new();
        while let Some(mut row) = cursor.next_row().map_err(map_error)? {
            let mut values = Vec::with_capacity(columns.len());
            for col in 1..=column_count {
                let present = row.get_text(col, &mut buf).map_err(map_error)?;
                values.push(if present {
                    SqlValue::Text(String::from_utf8_lossy(&buf).into_owned())
                } else {
                    SqlValue::Null
                });
            }
            result.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(result)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError> {
        let bound = to_params(params);
        let mut prepared = self.conn.preallocate().map_err(map_error)?;
        prepared.execute(sql, bound.as_slice()).map_err(map_error)?;
        let count = prepared.row_count().map_err(map_error)?;
        Ok(count.unwrap_or(0) as u64)
    }
}

fn to_params(params: &[SqlValue]) -> Vec<Box<dyn InputParameter>> {
    params
        .iter()
        .map(|value| -> Box<dyn InputParameter> {
            match value {
                SqlValue::Null => Box::new(Nullable::<f64>::null()),
                SqlValue::Integer(v) => Box::new(*v),
                SqlValue::Real(v) => Box::new(*v),
                SqlValue::Text(s) => Box::new(s.clone().into_parameter()),
            }
        })
        .collect()
}

fn map_error(err: odbc_api::Error) -> DriverError {
    match err {
        odbc_api::Error::Diagnostics { record, .. } => DriverError::new(
            record.native_error.to_string(),
            format!("SQLSTATE {}", record.state.as_str()),
            String::from_utf8_lossy(&record.message).into_owned(),
        ),
        other => DriverError::client(other.to_string()),
    }
}
