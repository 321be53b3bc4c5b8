//! Column metadata, raw rows and decoded values.

mod field_type;
mod metadata;
mod row;
mod value;

pub use field_type::FieldType;
pub use metadata::{ColumnFlags, ColumnMetadata};
pub use row::{OwnedRow, RawCell, RawRow};
pub use value::MysqlValue;
