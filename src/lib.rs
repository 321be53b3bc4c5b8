//! MySQL result-set materialization
//!
//! Turns a MySQL text-protocol result (column metadata plus rows of raw cell
//! bytes) into typed [`MysqlValue`]s, delivered as arrays, objects keyed by
//! column name, or objects nested by table. Results can be fetched on the
//! calling thread or in the background on a Tokio blocking worker.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mysql_result_rs::protocol::parse_text_result_set;
//! use mysql_result_rs::{BufferMode, FetchOptions, ResultCursor, SessionErrors, StoredResult};
//!
//! #[tokio::main]
//! async fn main() -> mysql_result_rs::Result<()> {
//!     // Packet payloads of one query response, as read from the connection.
//!     let packets: Vec<bytes::Bytes> = Vec::new();
//!
//!     let session = Arc::new(SessionErrors::new());
//!     let result = parse_text_result_set(packets, true)?;
//!     let handle =
//!         StoredResult::from_text_result_set(result, BufferMode::Buffered, session.clone())?;
//!     let mut cursor = ResultCursor::new(session, Box::new(handle));
//!
//!     let fetched = cursor
//!         .fetch_all_async(FetchOptions::default().with_nest_tables(true))?
//!         .await?;
//!     for row in &fetched.rows {
//!         println!("{}", row);
//!     }
//!
//!     cursor.free();
//!     Ok(())
//! }
//! ```

pub mod cursor;
pub mod error;
pub mod fetch;
pub mod handle;
pub mod protocol;
pub mod shape;

// Re-export main types
pub use cursor::ResultCursor;
pub use error::{Error, Result};
pub use fetch::{materialize_rows, BufferedRows, FetchAll, FetchedResult, RowSource};
pub use handle::{BufferMode, ConnectionHandle, ResultHandle, SessionErrors, StoredResult};
pub use protocol::types::{
    ColumnFlags, ColumnMetadata, FieldType, MysqlValue, OwnedRow, RawCell, RawRow,
};
pub use shape::{shape_row, FetchOptions, FieldMap, RowShape, ShapedRow};
