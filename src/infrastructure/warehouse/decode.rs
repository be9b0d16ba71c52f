//! Per-driver decoding of result cells into `RowValue`.
//!
//! Each driver reports a type name for every column. Timestamp and date
//! types become `RowValue::Timestamp`, exact numerics (`NUMERIC`, `DECIMAL`)
//! become `Float`, and character data is kept as text exactly as returned.

use crate::domain::errors::QueryError;
use crate::domain::types::{ResultRow, RowValue, parse_timestamp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

pub(crate) type CellDecoder<R> = fn(&R, usize) -> Result<RowValue, sqlx::Error>;

/// Decode every column of `row`, in cursor order.
pub(crate) fn decode_row<R: Row>(row: &R, decode: CellDecoder<R>) -> Result<ResultRow, QueryError> {
    let mut decoded = ResultRow::new();
    for column in row.columns() {
        let value = decode(row, column.ordinal()).map_err(|source| QueryError::Decode {
            column: column.name().to_string(),
            source,
        })?;
        decoded.insert(column.name(), value);
    }
    Ok(decoded)
}

pub(crate) fn postgres_value(row: &PgRow, index: usize) -> Result<RowValue, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(RowValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match type_name.as_str() {
        "BOOL" => RowValue::Bool(row.try_get(index)?),
        "INT2" => RowValue::Integer(row.try_get::<i16, _>(index)?.into()),
        "INT4" => RowValue::Integer(row.try_get::<i32, _>(index)?.into()),
        "INT8" => RowValue::Integer(row.try_get::<i64, _>(index)?),
        "FLOAT4" => RowValue::Float(row.try_get::<f32, _>(index)?.into()),
        "FLOAT8" => RowValue::Float(row.try_get::<f64, _>(index)?),
        "NUMERIC" => decimal_value(row.try_get(index)?)?,
        "TIMESTAMPTZ" => RowValue::Timestamp(row.try_get::<DateTime<Utc>, _>(index)?),
        "TIMESTAMP" => RowValue::Timestamp(row.try_get::<NaiveDateTime, _>(index)?.and_utc()),
        "DATE" => RowValue::Timestamp(midnight(row.try_get(index)?)?),
        _ => RowValue::Text(
            row.try_get::<String, _>(index)
                .map_err(|_| unsupported(&type_name))?,
        ),
    };
    Ok(value)
}

pub(crate) fn mysql_value(row: &MySqlRow, index: usize) -> Result<RowValue, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(RowValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match type_name.as_str() {
        "BOOLEAN" => RowValue::Bool(row.try_get(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            RowValue::Integer(row.try_get::<i64, _>(index)?)
        }
        name if name.ends_with(" UNSIGNED") => {
            let unsigned: u64 = row.try_get(index)?;
            match i64::try_from(unsigned) {
                Ok(signed) => RowValue::Integer(signed),
                Err(_) => RowValue::Float(unsigned as f64),
            }
        }
        "FLOAT" => RowValue::Float(row.try_get::<f32, _>(index)?.into()),
        "DOUBLE" => RowValue::Float(row.try_get::<f64, _>(index)?),
        "DECIMAL" => decimal_value(row.try_get(index)?)?,
        // DATETIME carries no zone and is read as UTC
        "DATETIME" | "TIMESTAMP" => RowValue::Timestamp(row.try_get::<DateTime<Utc>, _>(index)?),
        "DATE" => RowValue::Timestamp(midnight(row.try_get(index)?)?),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            RowValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => RowValue::Text(
            row.try_get::<String, _>(index)
                .map_err(|_| unsupported(&type_name))?,
        ),
    };
    Ok(value)
}

/// SQLite values carry a storage class (INTEGER, REAL, TEXT, BLOB) and the
/// column may carry a declared type. Declared date/time and boolean columns
/// are honoured; everything else follows the storage class.
pub(crate) fn sqlite_value(row: &SqliteRow, index: usize) -> Result<RowValue, sqlx::Error> {
    let declared = row.column(index).type_info().name().to_string();
    let storage = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(RowValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match (declared.as_str(), storage.as_str()) {
        ("BOOLEAN", "INTEGER") => RowValue::Bool(row.try_get::<i64, _>(index)? != 0),
        ("DATETIME" | "DATE", "INTEGER") => {
            let secs: i64 = row.try_get(index)?;
            let ts = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| decode_error(format!("{} is out of range for a timestamp", secs)))?;
            RowValue::Timestamp(ts)
        }
        ("DATETIME" | "DATE", "TEXT") => {
            let text: String = row.try_get(index)?;
            match parse_timestamp(&text) {
                Some(ts) => RowValue::Timestamp(ts),
                None => RowValue::Text(text),
            }
        }
        (_, "INTEGER") => RowValue::Integer(row.try_get(index)?),
        (_, "REAL") => RowValue::Float(row.try_get(index)?),
        (_, "TEXT") => RowValue::Text(row.try_get(index)?),
        (_, "BLOB") => {
            let bytes: Vec<u8> = row.try_get(index)?;
            RowValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        (_, other) => return Err(unsupported(other)),
    };
    Ok(value)
}

fn decimal_value(decimal: Decimal) -> Result<RowValue, sqlx::Error> {
    decimal
        .to_f64()
        .map(RowValue::Float)
        .ok_or_else(|| decode_error(format!("decimal {} does not fit in f64", decimal)))
}

fn midnight(date: NaiveDate) -> Result<DateTime<Utc>, sqlx::Error> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| decode_error(format!("date {} has no midnight", date)))
}

fn unsupported(type_name: &str) -> sqlx::Error {
    decode_error(format!("unsupported column type {}", type_name))
}

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}
