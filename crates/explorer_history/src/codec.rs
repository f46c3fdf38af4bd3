//! Decoders for the decimal-string fields explorers use for amounts and times.
//!
//! Amounts, gas figures and confirmation counts routinely exceed 64 bits, so
//! the API quotes them as base-10 strings. They decode into [`BigUint`] and
//! never pass through a machine word or a float.

use num_bigint::BigUint;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid decimal integer: {0:?}")]
    InvalidInteger(String),
    #[error("invalid unix timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("unix timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
    #[error("invalid transaction hash: {0:?}")]
    InvalidHash(String),
}

/// Parse a base-10 unsigned integer of any magnitude.
///
/// Surrounding whitespace and leading zeros are accepted; signs, separators
/// and the empty string are not.
pub fn parse_decimal(s: &str) -> Result<BigUint, DecodeError> {
    let digits = s.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidInteger(s.to_string()));
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| DecodeError::InvalidInteger(s.to_string()))
}

/// Parse a base-10 count of Unix seconds into a UTC point in time.
pub fn parse_unix_seconds(s: &str) -> Result<OffsetDateTime, DecodeError> {
    let secs = s
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidTimestamp(s.to_string()))?;
    OffsetDateTime::from_unix_timestamp(secs).map_err(|_| DecodeError::TimestampOutOfRange(secs))
}

/// Serde adapter: `BigUint` <-> JSON decimal string.
pub mod decimal {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_decimal(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter: `OffsetDateTime` <-> JSON string of Unix seconds.
pub mod unix_seconds {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(
        value: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.unix_timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_unix_seconds(&s).map_err(de::Error::custom)
    }
}
