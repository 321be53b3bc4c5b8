//! MySQL column type tags.
//!
//! The wire carries one byte per column. Tags this crate does not know are
//! kept as `Other` so they can still be decoded with the string fallback.

use crate::protocol::constants::*;

/// MySQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// DECIMAL/NUMERIC (pre-5.0 encoding).
    Decimal,
    /// TINYINT.
    Tiny,
    /// SMALLINT.
    Short,
    /// INT.
    Long,
    /// FLOAT.
    Float,
    /// DOUBLE/REAL.
    Double,
    /// NULL-typed column (e.g. `SELECT NULL`).
    Null,
    /// TIMESTAMP.
    Timestamp,
    /// BIGINT.
    LongLong,
    /// MEDIUMINT.
    Int24,
    /// DATE.
    Date,
    /// TIME.
    Time,
    /// DATETIME.
    DateTime,
    /// YEAR.
    Year,
    /// DATE (internal newer encoding).
    NewDate,
    /// VARCHAR.
    VarChar,
    /// BIT.
    Bit,
    /// JSON.
    Json,
    /// Precision-math DECIMAL/NUMERIC.
    NewDecimal,
    /// ENUM.
    Enum,
    /// SET.
    Set,
    /// TINYBLOB/TINYTEXT.
    TinyBlob,
    /// MEDIUMBLOB/MEDIUMTEXT.
    MediumBlob,
    /// LONGBLOB/LONGTEXT.
    LongBlob,
    /// BLOB/TEXT.
    Blob,
    /// VARCHAR/VARBINARY as sent by the server.
    VarString,
    /// CHAR/BINARY.
    String,
    /// Spatial types.
    Geometry,
    /// Any tag not listed above.
    Other(u8),
}

impl FieldType {
    /// Create from the raw type tag.
    pub fn from_raw(type_num: u8) -> Self {
        match type_num {
            MYSQL_TYPE_DECIMAL => FieldType::Decimal,
            MYSQL_TYPE_TINY => FieldType::Tiny,
            MYSQL_TYPE_SHORT => FieldType::Short,
            MYSQL_TYPE_LONG => FieldType::Long,
            MYSQL_TYPE_FLOAT => FieldType::Float,
            MYSQL_TYPE_DOUBLE => FieldType::Double,
            MYSQL_TYPE_NULL => FieldType::Null,
            MYSQL_TYPE_TIMESTAMP => FieldType::Timestamp,
            MYSQL_TYPE_LONGLONG => FieldType::LongLong,
            MYSQL_TYPE_INT24 => FieldType::Int24,
            MYSQL_TYPE_DATE => FieldType::Date,
            MYSQL_TYPE_TIME => FieldType::Time,
            MYSQL_TYPE_DATETIME => FieldType::DateTime,
            MYSQL_TYPE_YEAR => FieldType::Year,
            MYSQL_TYPE_NEWDATE => FieldType::NewDate,
            MYSQL_TYPE_VARCHAR => FieldType::VarChar,
            MYSQL_TYPE_BIT => FieldType::Bit,
            MYSQL_TYPE_JSON => FieldType::Json,
            MYSQL_TYPE_NEWDECIMAL => FieldType::NewDecimal,
            MYSQL_TYPE_ENUM => FieldType::Enum,
            MYSQL_TYPE_SET => FieldType::Set,
            MYSQL_TYPE_TINY_BLOB => FieldType::TinyBlob,
            MYSQL_TYPE_MEDIUM_BLOB => FieldType::MediumBlob,
            MYSQL_TYPE_LONG_BLOB => FieldType::LongBlob,
            MYSQL_TYPE_BLOB => FieldType::Blob,
            MYSQL_TYPE_VAR_STRING => FieldType::VarString,
            MYSQL_TYPE_STRING => FieldType::String,
            MYSQL_TYPE_GEOMETRY => FieldType::Geometry,
            other => FieldType::Other(other),
        }
    }

    /// Get the raw type tag.
    pub fn type_num(&self) -> u8 {
        match self {
            FieldType::Decimal => MYSQL_TYPE_DECIMAL,
            FieldType::Tiny => MYSQL_TYPE_TINY,
            FieldType::Short => MYSQL_TYPE_SHORT,
            FieldType::Long => MYSQL_TYPE_LONG,
            FieldType::Float => MYSQL_TYPE_FLOAT,
            FieldType::Double => MYSQL_TYPE_DOUBLE,
            FieldType::Null => MYSQL_TYPE_NULL,
            FieldType::Timestamp => MYSQL_TYPE_TIMESTAMP,
            FieldType::LongLong => MYSQL_TYPE_LONGLONG,
            FieldType::Int24 => MYSQL_TYPE_INT24,
            FieldType::Date => MYSQL_TYPE_DATE,
            FieldType::Time => MYSQL_TYPE_TIME,
            FieldType::DateTime => MYSQL_TYPE_DATETIME,
            FieldType::Year => MYSQL_TYPE_YEAR,
            FieldType::NewDate => MYSQL_TYPE_NEWDATE,
            FieldType::VarChar => MYSQL_TYPE_VARCHAR,
            FieldType::Bit => MYSQL_TYPE_BIT,
            FieldType::Json => MYSQL_TYPE_JSON,
            FieldType::NewDecimal => MYSQL_TYPE_NEWDECIMAL,
            FieldType::Enum => MYSQL_TYPE_ENUM,
            FieldType::Set => MYSQL_TYPE_SET,
            FieldType::TinyBlob => MYSQL_TYPE_TINY_BLOB,
            FieldType::MediumBlob => MYSQL_TYPE_MEDIUM_BLOB,
            FieldType::LongBlob => MYSQL_TYPE_LONG_BLOB,
            FieldType::Blob => MYSQL_TYPE_BLOB,
            FieldType::VarString => MYSQL_TYPE_VAR_STRING,
            FieldType::String => MYSQL_TYPE_STRING,
            FieldType::Geometry => MYSQL_TYPE_GEOMETRY,
            FieldType::Other(n) => *n,
        }
    }

    /// Whether the type carries character or binary string data.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            FieldType::TinyBlob
                | FieldType::MediumBlob
                | FieldType::LongBlob
                | FieldType::Blob
                | FieldType::String
                | FieldType::VarString
                | FieldType::VarChar
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Decimal | FieldType::NewDecimal => write!(f, "DECIMAL"),
            FieldType::Tiny => write!(f, "TINYINT"),
            FieldType::Short => write!(f, "SMALLINT"),
            FieldType::Long => write!(f, "INT"),
            FieldType::Float => write!(f, "FLOAT"),
            FieldType::Double => write!(f, "DOUBLE"),
            FieldType::Null => write!(f, "NULL"),
            FieldType::Timestamp => write!(f, "TIMESTAMP"),
            FieldType::LongLong => write!(f, "BIGINT"),
            FieldType::Int24 => write!(f, "MEDIUMINT"),
            FieldType::Date | FieldType::NewDate => write!(f, "DATE"),
            FieldType::Time => write!(f, "TIME"),
            FieldType::DateTime => write!(f, "DATETIME"),
            FieldType::Year => write!(f, "YEAR"),
            FieldType::VarChar | FieldType::VarString => write!(f, "VARCHAR"),
            FieldType::Bit => write!(f, "BIT"),
            FieldType::Json => write!(f, "JSON"),
            FieldType::Enum => write!(f, "ENUM"),
            FieldType::Set => write!(f, "SET"),
            FieldType::TinyBlob => write!(f, "TINYBLOB"),
            FieldType::MediumBlob => write!(f, "MEDIUMBLOB"),
            FieldType::LongBlob => write!(f, "LONGBLOB"),
            FieldType::Blob => write!(f, "BLOB"),
            FieldType::String => write!(f, "CHAR"),
            FieldType::Geometry => write!(f, "GEOMETRY"),
            FieldType::Other(n) => write!(f, "TYPE({})", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_known() {
        assert_eq!(FieldType::from_raw(MYSQL_TYPE_LONGLONG), FieldType::LongLong);
        assert_eq!(FieldType::from_raw(MYSQL_TYPE_NEWDECIMAL), FieldType::NewDecimal);
        assert_eq!(FieldType::from_raw(MYSQL_TYPE_GEOMETRY), FieldType::Geometry);
    }

    #[test]
    fn test_from_raw_unknown_is_preserved() {
        let t = FieldType::from_raw(20);
        assert_eq!(t, FieldType::Other(20));
        assert_eq!(t.type_num(), 20);
    }

    #[test]
    fn test_type_num_inverts_from_raw() {
        for tag in (0u8..=20).chain(245..=255) {
            assert_eq!(FieldType::from_raw(tag).type_num(), tag);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FieldType::LongLong), "BIGINT");
        assert_eq!(format!("{}", FieldType::Other(20)), "TYPE(20)");
    }
}
