//! Decoded cell values.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum MysqlValue {
    /// SQL NULL.
    Null,
    /// TINYINT, SMALLINT, INT, MEDIUMINT and YEAR.
    Int(i64),
    /// FLOAT and DOUBLE.
    Float(f64),
    /// Text. BIGINT, BIT and DECIMAL values are kept here verbatim so no
    /// precision is lost; parse them with [`to_i64`](Self::to_i64) or a
    /// decimal library as needed.
    String(String),
    /// Binary string/blob data, exact length.
    Bytes(Bytes),
    /// TIME, as an instant that far past the Unix epoch.
    Time(DateTime<Utc>),
    /// DATE, DATETIME and TIMESTAMP, read as UTC.
    DateTime(DateTime<Utc>),
    /// SET members in declaration order.
    Set(Vec<String>),
}

impl MysqlValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, MysqlValue::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MysqlValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to i64. Text values (BIGINT) are parsed.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            MysqlValue::Int(n) => Some(*n),
            MysqlValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            MysqlValue::Float(n) => Some(*n),
            MysqlValue::Int(n) => Some(*n as f64),
            MysqlValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MysqlValue::Bytes(b) => Some(b),
            MysqlValue::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to get the value as a date/time instant.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            MysqlValue::DateTime(dt) | MysqlValue::Time(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Try to get the members of a SET value.
    pub fn as_set(&self) -> Option<&[String]> {
        match self {
            MysqlValue::Set(members) => Some(members),
            _ => None,
        }
    }
}

impl fmt::Display for MysqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MysqlValue::Null => write!(f, "NULL"),
            MysqlValue::Int(n) => write!(f, "{}", n),
            MysqlValue::Float(n) => write!(f, "{}", n),
            MysqlValue::String(s) => write!(f, "{}", s),
            MysqlValue::Bytes(b) => write!(f, "<BINARY: {} bytes>", b.len()),
            MysqlValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            MysqlValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            MysqlValue::Set(members) => write!(f, "{}", members.join(",")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_null() {
        let val = MysqlValue::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_value_bigint_text() {
        let val = MysqlValue::String("9223372036854775807".to_string());
        assert_eq!(val.to_i64(), Some(i64::MAX));
        assert_eq!(val.as_str(), Some("9223372036854775807"));
    }

    #[test]
    fn test_value_set_display() {
        let val = MysqlValue::Set(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(val.as_set().map(|m| m.len()), Some(2));
        assert_eq!(format!("{}", val), "a,b");
    }

    #[test]
    fn test_value_bytes() {
        let val = MysqlValue::Bytes(Bytes::from_static(b"a\0b"));
        assert_eq!(val.as_bytes(), Some(&b"a\0b"[..]));
        assert_eq!(format!("{}", val), "<BINARY: 3 bytes>");
    }
}
