//! Shared row decoding helpers

use chorus_core::{ChorusError, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

/// Decode a text column into an enum implementing `FromStr`
pub(crate) fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| ChorusError::storage(format!("column {column}: {e}")))
}

/// Decode a non-negative position column
pub(crate) fn position(row: &SqliteRow, column: &str) -> Result<u32> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw)
        .map_err(|_| ChorusError::storage(format!("column {column}: invalid position {raw}")))
}
