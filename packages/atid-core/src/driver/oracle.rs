//! Oracle driver backed by the `oracle` crate (ODPI-C).

use std::sync::Arc;

use ::oracle::sql_type::ToSql;
use ::oracle::{Connection, Version};

use super::{ConnectTarget, Driver, DriverConnection, Engine, Row, SqlValue};
use crate::error::DriverError;

/// Oracle engine driver. Needs the Oracle client libraries at runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDriver;

impl Driver for OracleDriver {
    fn engine(&self) -> Engine {
        Engine::Oracle
    }

    fn handle_name(&self) -> &'static str {
        "oci"
    }

    fn label(&self) -> &'static str {
        "Oracle (OCI)"
    }

    fn probe(&self) -> bool {
        match Version::client() {
            Ok(version) => {
                tracing::debug!("Oracle client library {} found", version);
                true
            }
            Err(e) => {
                tracing::debug!("Oracle client library not loadable: {}", e);
                false
            }
        }
    }

    fn open(&self, target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError> {
        let ConnectTarget::Network(params) = target else {
            return Err(DriverError::client("Oracle expects network parameters"));
        };
        let connect_string = format!("//{}:{}/{}", params.host, params.port, params.database);
        let conn = Connection::connect(&params.user, &params.password, connect_string)
            .map_err(map_error)?;
        Ok(Box::new(OracleConnection { conn }))
    }
}

struct OracleConnection {
    conn: Connection,
}

impl DriverConnection for OracleConnection {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        let bound = to_params(params);
        let refs: Vec<&dyn ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        let rows = self.conn.query(sql, &refs).map_err(map_error)?;
        let columns: Arc<[String]> = rows
            .column_info()
            .iter()
            .map(|info| info.name().to_string())
            .collect();

        let mut result = Vec::new();
        for row in rows {
            let row = row.map_err(map_error)?;
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                // Numbers come back as text and are parsed by `Row::get_f64`.
                let cell: Option<String> = row.get(idx).map_err(map_error)?;
                values.push(cell.map_or(SqlValue::Null, SqlValue::Text));
            }
            result.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(result)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError> {
        let bound = to_params(params);
        let refs: Vec<&dyn ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        let stmt = self.conn.execute(sql, &refs).map_err(map_error)?;
        let count = stmt.row_count().map_err(map_error)?;
        self.conn.commit().map_err(map_error)?;
        Ok(count)
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.conn.close().map_err(map_error)
    }
}

fn to_params(params: &[SqlValue]) -> Vec<Box<dyn ToSql>> {
    params
        .iter()
        .map(|value| -> Box<dyn ToSql> {
            match value {
                SqlValue::Null => Box::new(Option::<f64>::None),
                SqlValue::Integer(v) => Box::new(*v),
                SqlValue::Real(v) => Box::new(*v),
                SqlValue::Text(s) => Box::new(s.clone()),
            }
        })
        .collect()
}

fn map_error(err: ::oracle::Error) -> DriverError {
    match err.db_error() {
        Some(db) => DriverError::new(
            format!("ORA-{:05}", db.code()),
            err.to_string(),
            db.message(),
        ),
        None => DriverError::client(err.to_string()),
    }
}
