//! MySQL driver backed by the `mysql` crate.

use std::sync::Arc;

use ::mysql::prelude::Queryable;
use ::mysql::{Conn, Opts, OptsBuilder, Params, Value};

use super::{ConnectTarget, Driver, DriverConnection, Engine, Row, SqlValue};
use crate::error::DriverError;

/// MySQL / MariaDB engine driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDriver;

impl Driver for MySqlDriver {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    fn handle_name(&self) -> &'static str {
        "mysql"
    }

    fn label(&self) -> &'static str {
        "MySQL / MariaDB"
    }

    fn open(&self, target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError> {
        let ConnectTarget::Network(params) = target else {
            return Err(DriverError::client("MySQL expects network parameters"));
        };
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(params.host.clone()))
            .tcp_port(params.port)
            .db_name(Some(params.database.clone()))
            .user(Some(params.user.clone()))
            .pass(Some(params.password.clone()));
        let conn = Conn::new(Opts::from(opts)).map_err(map_error)?;
        Ok(Box::new(MySqlConnection { conn }))
    }
}

struct MySqlConnection {
    conn: Conn,
}

impl DriverConnection for MySqlConnection {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        let rows: Vec<::mysql::Row> = self
            .conn
            .exec(sql, to_params(params))
            .map_err(map_error)?;

        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let columns: Arc<[String]> = first
            .columns_ref()
            .iter()
            .map(|col| col.name_str().into_owned())
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let values = row.unwrap().into_iter().map(from_mysql).collect();
                Row::new(Arc::clone(&columns), values)
            })
            .collect())
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError> {
        self.conn
            .exec_drop(sql, to_params(params))
            .map_err(map_error)?;
        Ok(self.conn.affected_rows())
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        drop(self.conn);
        Ok(())
    }
}

fn to_params(params: &[SqlValue]) -> Params {
    if params.is_empty() {
        return Params::Empty;
    }
    Params::Positional(
        params
            .iter()
            .map(|value| match value {
                SqlValue::Null => Value::NULL,
                SqlValue::Integer(v) => Value::Int(*v),
                SqlValue::Real(v) => Value::Double(*v),
                SqlValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
            })
            .collect(),
    )
}

fn from_mysql(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(v) => SqlValue::Integer(v),
        Value::UInt(v) => i64::try_from(v)
            .map(SqlValue::Integer)
            .unwrap_or(SqlValue::Real(v as f64)),
        Value::Float(v) => SqlValue::Real(f64::from(v)),
        Value::Double(v) => SqlValue::Real(v),
        Value::Bytes(bytes) => SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        other => SqlValue::Text(other.as_sql(true)),
    }
}

fn map_error(err: ::mysql::Error) -> DriverError {
    match err {
        ::mysql::Error::MySqlError(server) => DriverError::new(
            server.code.to_string(),
            format!("SQLSTATE {}", server.state),
            server.message,
        ),
        other => DriverError::client(other.to_string()),
    }
}
