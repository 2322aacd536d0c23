//! Helpers for decoding text columns into domain values.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Parses an enum-like text column, naming the column on failure.
pub fn parse_column<T>(value: &str, column: &str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map_err(|e| StorageError::Corrupt(format!("{} '{}': {}", column, value, e)))
}

/// Amounts are stored as text to keep their exact scale.
pub fn parse_amount(value: &str, column: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value.trim())
        .map_err(|e| StorageError::Corrupt(format!("{} '{}': {}", column, value, e)))
}
