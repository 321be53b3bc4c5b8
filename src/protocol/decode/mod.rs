//! Cell decoders for the MySQL text protocol.
//!
//! `decode_cell` turns one raw cell into a [`MysqlValue`] according to the
//! column's type tag and flags.
//!
//! | MySQL type | Value |
//! |------------|-------|
//! | TINYINT, SMALLINT, INT, MEDIUMINT, YEAR | `Int` |
//! | BIGINT, BIT, DECIMAL | `String` (no precision loss) |
//! | FLOAT, DOUBLE | `Float` |
//! | TIME | `Time` |
//! | DATE, DATETIME, TIMESTAMP | `DateTime` (UTC) |
//! | BLOB/TEXT/CHAR family | `Bytes` if binary, else `String` |
//! | SET | `Set` |
//! | ENUM, GEOMETRY, JSON, unknown | `String` |

mod date;
mod number;

pub use date::{parse_datetime_utc, parse_time_of_day, parse_time_seconds};
pub use number::{parse_float, parse_integer};

use bytes::Bytes;

use crate::protocol::types::{ColumnMetadata, FieldType, MysqlValue, RawCell};

/// Decode one cell.
///
/// A NULL cell is always `MysqlValue::Null`. A column carrying the SET flag
/// is decoded as a SET whatever its type tag says.
pub fn decode_cell(column: &ColumnMetadata, raw: RawCell<'_>) -> MysqlValue {
    let Some(data) = raw else {
        return MysqlValue::Null;
    };

    // The SET flag wins over the type tag: SET columns are often reported
    // as STRING.
    if column.is_set() {
        return MysqlValue::Set(split_set(data));
    }

    match column.field_type {
        FieldType::Null => MysqlValue::Null,
        FieldType::Tiny
        | FieldType::Short
        | FieldType::Long
        | FieldType::Int24
        | FieldType::Year => {
            let text = lossy_text(data);
            match parse_integer(&text) {
                Some(n) => MysqlValue::Int(n),
                None => fallback(column, text),
            }
        }
        FieldType::Float | FieldType::Double => {
            let text = lossy_text(data);
            match parse_float(&text) {
                Some(n) => MysqlValue::Float(n),
                None => fallback(column, text),
            }
        }
        FieldType::Bit
        | FieldType::LongLong
        | FieldType::Decimal
        | FieldType::NewDecimal => MysqlValue::String(lossy_text(data)),
        FieldType::Time => {
            let text = lossy_text(data);
            match parse_time_of_day(&text) {
                Some(t) => MysqlValue::Time(t),
                None => fallback(column, text),
            }
        }
        FieldType::Timestamp | FieldType::DateTime | FieldType::Date | FieldType::NewDate => {
            let text = lossy_text(data);
            match parse_datetime_utc(&text) {
                Some(dt) => MysqlValue::DateTime(dt),
                None => fallback(column, text),
            }
        }
        t if t.is_string_like() => {
            if column.is_binary() {
                MysqlValue::Bytes(Bytes::copy_from_slice(data))
            } else {
                MysqlValue::String(lossy_text(data))
            }
        }
        FieldType::Set => MysqlValue::Set(split_set(data)),
        _ => MysqlValue::String(lossy_text(data)),
    }
}

/// Decode every cell of a row against its columns.
///
/// Cells beyond the column list are ignored; missing cells decode as NULL.
pub fn decode_row<'a>(
    columns: &[ColumnMetadata],
    cells: impl Iterator<Item = RawCell<'a>>,
) -> Vec<MysqlValue> {
    let mut cells = cells;
    columns
        .iter()
        .map(|col| decode_cell(col, cells.next().flatten()))
        .collect()
}

/// Split SET text on commas, keeping empty members.
///
/// An empty cell is the empty set.
pub fn split_set(data: &[u8]) -> Vec<String> {
    if data.is_empty() {
        return Vec::new();
    }
    data.split(|&b| b == b',')
        .map(|member| String::from_utf8_lossy(member).into_owned())
        .collect()
}

fn lossy_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn fallback(column: &ColumnMetadata, text: String) -> MysqlValue {
    tracing::warn!(
        column = %column.name,
        field_type = %column.field_type,
        value = %text,
        "cell text does not parse as its column type, keeping it as a string"
    );
    MysqlValue::String(text)
}
