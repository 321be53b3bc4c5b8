//! Column metadata as reported by the server for each result column.

use std::fmt;

use crate::protocol::constants::*;

use super::field_type::FieldType;

/// Column flag bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnFlags(u32);

impl ColumnFlags {
    pub const NOT_NULL: ColumnFlags = ColumnFlags(NOT_NULL_FLAG);
    pub const PRI_KEY: ColumnFlags = ColumnFlags(PRI_KEY_FLAG);
    pub const UNIQUE_KEY: ColumnFlags = ColumnFlags(UNIQUE_KEY_FLAG);
    pub const MULTIPLE_KEY: ColumnFlags = ColumnFlags(MULTIPLE_KEY_FLAG);
    pub const BLOB: ColumnFlags = ColumnFlags(BLOB_FLAG);
    pub const UNSIGNED: ColumnFlags = ColumnFlags(UNSIGNED_FLAG);
    pub const ZEROFILL: ColumnFlags = ColumnFlags(ZEROFILL_FLAG);
    pub const BINARY: ColumnFlags = ColumnFlags(BINARY_FLAG);
    pub const ENUM: ColumnFlags = ColumnFlags(ENUM_FLAG);
    pub const AUTO_INCREMENT: ColumnFlags = ColumnFlags(AUTO_INCREMENT_FLAG);
    pub const TIMESTAMP: ColumnFlags = ColumnFlags(TIMESTAMP_FLAG);
    pub const SET: ColumnFlags = ColumnFlags(SET_FLAG);
    pub const NO_DEFAULT_VALUE: ColumnFlags = ColumnFlags(NO_DEFAULT_VALUE_FLAG);
    pub const ON_UPDATE_NOW: ColumnFlags = ColumnFlags(ON_UPDATE_NOW_FLAG);
    pub const NUM: ColumnFlags = ColumnFlags(NUM_FLAG);

    /// Empty flag set.
    pub const fn empty() -> Self {
        ColumnFlags(0)
    }

    /// Wrap raw flag bits.
    pub const fn from_bits(bits: u32) -> Self {
        ColumnFlags(bits)
    }

    /// Raw flag bits.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(&self, other: ColumnFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ColumnFlags {
    type Output = ColumnFlags;

    fn bitor(self, rhs: ColumnFlags) -> ColumnFlags {
        ColumnFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ColumnFlags {
    fn bitor_assign(&mut self, rhs: ColumnFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ColumnFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Metadata of one result column.
///
/// Immutable once read from the result; one instance per column, in select
/// order. Text attributes the server leaves out are empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Column name or alias.
    pub name: String,
    /// Original column name, if the column maps to a table column.
    pub org_name: String,
    /// Table name or alias.
    pub table: String,
    /// Original table name.
    pub org_table: String,
    /// Default value.
    pub def: String,
    /// Maximum width of the column values in this result.
    pub max_length: u64,
    /// Declared column width.
    pub length: u64,
    /// Character set / collation id.
    pub charset_nr: u32,
    /// Flag bits.
    pub flags: ColumnFlags,
    /// Column type.
    pub field_type: FieldType,
    /// Number of decimals for numeric columns.
    pub decimals: u32,
}

impl ColumnMetadata {
    /// Create new column metadata with minimal info.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            org_name: String::new(),
            table: String::new(),
            org_table: String::new(),
            def: String::new(),
            max_length: 0,
            length: 0,
            charset_nr: 0,
            flags: ColumnFlags::empty(),
            field_type,
            decimals: 0,
        }
    }

    /// Set the table name (and original table name if unset).
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        if self.org_table.is_empty() {
            self.org_table = self.table.clone();
        }
        self
    }

    /// Add flag bits.
    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the declared length.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    /// Whether the column holds binary data.
    pub fn is_binary(&self) -> bool {
        self.flags.contains(ColumnFlags::BINARY)
    }

    /// Whether the server flagged the column as a SET.
    pub fn is_set(&self) -> bool {
        self.flags.contains(ColumnFlags::SET)
    }
}
