//! PostgreSQL driver backed by the `postgres` crate.

use std::error::Error;
use std::sync::Arc;

use ::postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use bytes::BytesMut;
use ::postgres::{Client, Config, NoTls};

use super::{ConnectTarget, Driver, DriverConnection, Engine, Row, SqlValue};
use crate::error::DriverError;

/// PostgreSQL engine driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn engine(&self) -> Engine {
        Engine::PostgreSql
    }

    fn handle_name(&self) -> &'static str {
        "postgres"
    }

    fn label(&self) -> &'static str {
        "PostgreSQL (native protocol)"
    }

    fn open(&self, target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError> {
        let ConnectTarget::Network(params) = target else {
            return Err(DriverError::client("PostgreSQL expects network parameters"));
        };
        let mut config = Config::new();
        config
            .host(&params.host)
            .port(params.port)
            .dbname(&params.database)
            .user(&params.user)
            .password(&params.password);
        let client = config.connect(NoTls).map_err(map_error)?;
        Ok(Box::new(PostgresConnection { client }))
    }
}

struct PostgresConnection {
    client: Client,
}

impl DriverConnection for PostgresConnection {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        let stmt = self.client.prepare(sql).map_err(map_error)?;
        let columns: Arc<[String]> = stmt
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();
        let bound = to_params(params, stmt.params());
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p.as_ref()).collect();

        let mut result = Vec::new();
        for row in self.client.query(&stmt, &refs).map_err(map_error)? {
            let mut values = Vec::with_capacity(columns.len());
            for (idx, col) in row.columns().iter().enumerate() {
                values.push(read_cell(&row, idx, col.type_()).map_err(map_error)?);
            }
            result.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(result)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError> {
        let stmt = self.client.prepare(sql).map_err(map_error)?;
        let bound = to_params(params, stmt.params());
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p.as_ref()).collect();
        self.client.execute(&stmt, &refs).map_err(map_error)
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.client.close().map_err(map_error)
    }
}

/// Binds values against the parameter types the server inferred.
fn to_params(params: &[SqlValue], types: &[Type]) -> Vec<Box<dyn ToSql + Sync>> {
    params
        .iter()
        .enumerate()
        .map(|(idx, value)| -> Box<dyn ToSql + Sync> {
            let numeric = types.get(idx) == Some(&Type::NUMERIC);
            match value {
                SqlValue::Null => Box::new(Null),
                SqlValue::Integer(v) if numeric => Box::new(Numeric(*v as f64)),
                SqlValue::Real(v) if numeric => Box::new(Numeric(*v)),
                SqlValue::Integer(v) => Box::new(*v),
                SqlValue::Real(v) => Box::new(*v),
                SqlValue::Text(s) => Box::new(s.clone()),
            }
        })
        .collect()
}

fn read_cell(
    row: &::postgres::Row,
    idx: usize,
    ty: &Type,
) -> Result<SqlValue, ::postgres::Error> {
    let value = match *ty {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(SqlValue::Integer),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| SqlValue::Real(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(SqlValue::Real),
        Type::NUMERIC => row
            .try_get::<_, Option<Numeric>>(idx)?
            .map(|v| SqlValue::Real(v.0)),
        _ => row.try_get::<_, Option<String>>(idx)?.map(SqlValue::Text),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

fn map_error(err: ::postgres::Error) -> DriverError {
    match err.as_db_error() {
        Some(db) => DriverError::new(db.code().code(), err.to_string(), db.message()),
        None => DriverError::new(
            err.code().map(|c| c.code().to_string()).unwrap_or_default(),
            err.to_string(),
            "",
        ),
    }
}

/// SQL NULL for a parameter of any type.
#[derive(Debug)]
struct Null;

impl ToSql for Null {
    fn to_sql(&self, _ty: &Type, _out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// NUMERIC value carried as the nearest `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Numeric(f64);

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

impl<'a> FromSql<'a> for Numeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        decode_numeric(raw).map(Numeric)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

impl ToSql for Numeric {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        encode_numeric(self.0, out);
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }

    to_sql_checked!();
}

/// Decodes the binary NUMERIC layout: digit count, weight, sign and display
/// scale as 16-bit words, then base-10000 digits, most significant first.
fn decode_numeric(raw: &[u8]) -> Result<f64, Box<dyn Error + Sync + Send>> {
    let word = |idx: usize| -> Result<u16, Box<dyn Error + Sync + Send>> {
        raw.get(idx * 2..idx * 2 + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated NUMERIC value".into())
    };
    let ndigits = usize::from(word(0)?);
    let weight = i32::from(word(1)? as i16);
    let sign = word(2)?;
    match sign {
        NUMERIC_NAN => return Ok(f64::NAN),
        NUMERIC_PINF => return Ok(f64::INFINITY),
        NUMERIC_NINF => return Ok(f64::NEG_INFINITY),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid NUMERIC sign {other:#06x}").into()),
    }
    if ndigits == 0 {
        return Ok(0.0);
    }

    let mut mantissa = String::with_capacity(ndigits * 4 + 1);
    if sign == NUMERIC_NEG {
        mantissa.push('-');
    }
    for idx in 0..ndigits {
        let digit = word(4 + idx)?;
        if digit >= 10_000 {
            return Err(format!("invalid NUMERIC digit {digit}").into());
        }
        mantissa.push_str(&format!("{digit:04}"));
    }
    let exponent = 4 * (weight - (ndigits as i32 - 1));
    Ok(format!("{mantissa}e{exponent}").parse::<f64>()?)
}

fn encode_numeric(value: f64, out: &mut BytesMut) {
    let header = |out: &mut BytesMut, ndigits: u16, weight: i16, sign: u16, dscale: u16| {
        out.extend_from_slice(&ndigits.to_be_bytes());
        out.extend_from_slice(&weight.to_be_bytes());
        out.extend_from_slice(&sign.to_be_bytes());
        out.extend_from_slice(&dscale.to_be_bytes());
    };
    if value.is_nan() {
        return header(out, 0, 0, NUMERIC_NAN, 0);
    }
    if value.is_infinite() {
        let sign = if value > 0.0 { NUMERIC_PINF } else { NUMERIC_NINF };
        return header(out, 0, 0, sign, 0);
    }

    // shortest decimal form that reads back as the same double, no exponent
    let text = format!("{}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let int_pad = (4 - int_part.len() % 4) % 4;
    let frac_pad = (4 - frac_part.len() % 4) % 4;
    let digits_text = format!(
        "{}{}{}{}",
        "0".repeat(int_pad),
        int_part,
        frac_part,
        "0".repeat(frac_pad)
    );
    let mut groups: Vec<u16> = digits_text
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
        })
        .collect();
    let mut weight = ((int_part.len() + int_pad) / 4) as i16 - 1;

    let leading = groups.iter().take_while(|&&g| g == 0).count();
    groups.drain(..leading);
    weight -= leading as i16;
    while groups.last() == Some(&0) {
        groups.pop();
    }

    let dscale = frac_part.len() as u16;
    if groups.is_empty() {
        return header(out, 0, 0, NUMERIC_POS, dscale);
    }
    let sign = if value < 0.0 { NUMERIC_NEG } else { NUMERIC_POS };
    header(out, groups.len() as u16, weight, sign, dscale);
    for group in groups {
        out.extend_from_slice(&group.to_be_bytes());
    }
}
