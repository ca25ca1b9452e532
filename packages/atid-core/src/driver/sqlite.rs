//! SQLite driver backed by `rusqlite`.

use std::sync::Arc;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};

use super::{ConnectTarget, Driver, DriverConnection, Engine, Row, SqlValue};
use crate::error::DriverError;

/// SQLite engine driver. The connection target is a database file path.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    fn handle_name(&self) -> &'static str {
        "sqlite3"
    }

    fn label(&self) -> &'static str {
        "SQLite 3 (bundled)"
    }

    fn open(&self, target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError> {
        let ConnectTarget::Named(path) = target else {
            return Err(DriverError::client("SQLite expects a database file path"));
        };
        // The catalog must already exist; never create an empty file.
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(map_error)?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

struct SqliteConnection {
    conn: Connection,
}

impl DriverConnection for SqliteConnection {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        let mut stmt = self.conn.prepare(sql).map_err(map_error)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sqlite)))
            .map_err(map_error)?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(map_error)? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(from_sqlite(row.get_ref(idx).map_err(map_error)?));
            }
            result.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(result)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError> {
        let changed = self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_sqlite)))
            .map_err(map_error)?;
        Ok(changed as u64)
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.conn.close().map_err(|(_, e)| map_error(e))
    }
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn map_error(err: rusqlite::Error) -> DriverError {
    match err {
        rusqlite::Error::SqliteFailure(native, message) => DriverError::new(
            native.extended_code.to_string(),
            native.to_string(),
            message.unwrap_or_default(),
        ),
        other => DriverError::client(other.to_string()),
    }
}
