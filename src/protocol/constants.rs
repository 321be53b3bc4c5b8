//! MySQL protocol constants.
//!
//! Column type tags and flag bits as sent in column definition packets
//! (`enum_field_types` and the `*_FLAG` values of the client library).

// Column types
pub const MYSQL_TYPE_DECIMAL: u8 = 0;
pub const MYSQL_TYPE_TINY: u8 = 1;
pub const MYSQL_TYPE_SHORT: u8 = 2;
pub const MYSQL_TYPE_LONG: u8 = 3;
pub const MYSQL_TYPE_FLOAT: u8 = 4;
pub const MYSQL_TYPE_DOUBLE: u8 = 5;
pub const MYSQL_TYPE_NULL: u8 = 6;
pub const MYSQL_TYPE_TIMESTAMP: u8 = 7;
pub const MYSQL_TYPE_LONGLONG: u8 = 8;
pub const MYSQL_TYPE_INT24: u8 = 9;
pub const MYSQL_TYPE_DATE: u8 = 10;
pub const MYSQL_TYPE_TIME: u8 = 11;
pub const MYSQL_TYPE_DATETIME: u8 = 12;
pub const MYSQL_TYPE_YEAR: u8 = 13;
pub const MYSQL_TYPE_NEWDATE: u8 = 14;
pub const MYSQL_TYPE_VARCHAR: u8 = 15;
pub const MYSQL_TYPE_BIT: u8 = 16;
pub const MYSQL_TYPE_JSON: u8 = 245;
pub const MYSQL_TYPE_NEWDECIMAL: u8 = 246;
pub const MYSQL_TYPE_ENUM: u8 = 247;
pub const MYSQL_TYPE_SET: u8 = 248;
pub const MYSQL_TYPE_TINY_BLOB: u8 = 249;
pub const MYSQL_TYPE_MEDIUM_BLOB: u8 = 250;
pub const MYSQL_TYPE_LONG_BLOB: u8 = 251;
pub const MYSQL_TYPE_BLOB: u8 = 252;
pub const MYSQL_TYPE_VAR_STRING: u8 = 253;
pub const MYSQL_TYPE_STRING: u8 = 254;
pub const MYSQL_TYPE_GEOMETRY: u8 = 255;

// Column flags
pub const NOT_NULL_FLAG: u32 = 1;
pub const PRI_KEY_FLAG: u32 = 2;
pub const UNIQUE_KEY_FLAG: u32 = 4;
pub const MULTIPLE_KEY_FLAG: u32 = 8;
pub const BLOB_FLAG: u32 = 16;
pub const UNSIGNED_FLAG: u32 = 32;
pub const ZEROFILL_FLAG: u32 = 64;
pub const BINARY_FLAG: u32 = 128;
pub const ENUM_FLAG: u32 = 256;
pub const AUTO_INCREMENT_FLAG: u32 = 512;
pub const TIMESTAMP_FLAG: u32 = 1024;
pub const SET_FLAG: u32 = 2048;
pub const NO_DEFAULT_VALUE_FLAG: u32 = 4096;
pub const ON_UPDATE_NOW_FLAG: u32 = 8192;
pub const NUM_FLAG: u32 = 32768;

// Text protocol markers
pub const NULL_CELL_MARKER: u8 = 0xFB;
pub const LENENC_U16_PREFIX: u8 = 0xFC;
pub const LENENC_U24_PREFIX: u8 = 0xFD;
pub const LENENC_U64_PREFIX: u8 = 0xFE;
pub const ERR_PACKET_HEADER: u8 = 0xFF;
pub const EOF_PACKET_HEADER: u8 = 0xFE;

/// Length of the fixed-size block in a column definition packet.
pub const COLUMN_DEFINITION_FIXED_LENGTH: u64 = 0x0C;

/// Binary collation id; text columns with this charset carry `BINARY_FLAG`.
pub const BINARY_CHARSET_NR: u16 = 63;
