//! MySQL text protocol: packet buffers, result-set packets and cell decoding.

pub mod buffer;
pub mod constants;
pub mod decode;
pub mod text;
pub mod types;

pub use buffer::{ReadBuffer, WriteBuffer};
pub use decode::{decode_cell, decode_row};
pub use text::{parse_text_result_set, ServerError, TextResultSet};
pub use types::{ColumnFlags, ColumnMetadata, FieldType, MysqlValue, OwnedRow, RawCell, RawRow};
