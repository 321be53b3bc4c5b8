//! Result cursor: row and field navigation over one result handle.
//!
//! A [`ResultCursor`] owns its result handle through shared state so an
//! async fetch in flight can keep the handle alive after [`ResultCursor::free`].
//! The handle is released exactly once, when the last holder lets go.
//!
//! Every operation first checks that the result has not been freed and
//! fails with [`Error::FreedResult`] otherwise.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::handle::{ConnectionHandle, ResultHandle};
use crate::protocol::types::ColumnMetadata;

/// State shared between a cursor and its in-flight fetches.
pub(crate) struct SharedResult {
    handle: Mutex<Box<dyn ResultHandle>>,
    pub(crate) connection: Arc<dyn ConnectionHandle>,
    pub(crate) fields: Vec<ColumnMetadata>,
}

impl SharedResult {
    /// Lock the handle for row access.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Box<dyn ResultHandle>>> {
        self.handle.lock().map_err(|_| Error::HandlePoisoned)
    }
}

impl Drop for SharedResult {
    fn drop(&mut self) {
        let handle = match self.handle.get_mut() {
            Ok(handle) => handle,
            Err(poisoned) => poisoned.into_inner(),
        };
        handle.release();
        tracing::debug!(fields = self.fields.len(), "result released");
    }
}

/// Cursor over one query result.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use bytes::Bytes;
/// use mysql_result_rs::{
///     ColumnMetadata, FetchOptions, FieldType, MysqlValue, OwnedRow, ResultCursor,
///     SessionErrors, StoredResult,
/// };
///
/// # fn main() -> mysql_result_rs::Result<()> {
/// let fields = vec![ColumnMetadata::new("id", FieldType::Long).with_table("users")];
/// let rows = vec![OwnedRow::new(vec![Some(Bytes::from_static(b"7"))])];
/// let mut cursor = ResultCursor::new(
///     Arc::new(SessionErrors::new()),
///     Box::new(StoredResult::buffered(fields, rows)),
/// );
///
/// assert_eq!(cursor.num_rows()?, 1);
/// let rows = cursor.fetch_all(FetchOptions::default())?;
/// assert_eq!(rows[0].as_object().unwrap()["id"], MysqlValue::Int(7));
///
/// cursor.free();
/// assert!(cursor.num_rows().is_err());
/// # Ok(())
/// # }
/// ```
pub struct ResultCursor {
    /// Shared state, `None` once freed.
    shared: Option<Arc<SharedResult>>,
    field_count: u32,
    /// Field cursor position.
    field_pos: usize,
}

impl ResultCursor {
    /// Wrap a result handle.
    pub fn new(connection: Arc<dyn ConnectionHandle>, handle: Box<dyn ResultHandle>) -> Self {
        let fields = handle.fields().to_vec();
        let field_count = fields.len() as u32;
        tracing::debug!(
            fields = field_count,
            unbuffered = handle.is_unbuffered(),
            "result cursor opened"
        );

        Self {
            shared: Some(Arc::new(SharedResult {
                handle: Mutex::new(handle),
                connection,
                fields,
            })),
            field_count,
            field_pos: 0,
        }
    }

    /// Shared state of a live result.
    pub(crate) fn shared(&self) -> Result<&Arc<SharedResult>> {
        self.shared.as_ref().ok_or(Error::FreedResult)
    }

    /// Number of columns, or `None` for a result without columns.
    pub fn field_count(&self) -> Result<Option<u32>> {
        self.shared()?;
        Ok((self.field_count > 0).then_some(self.field_count))
    }

    /// Move the row cursor to `offset` (0-based).
    ///
    /// Only buffered results can seek.
    pub fn data_seek(&mut self, offset: u64) -> Result<()> {
        let shared = self.shared()?;
        let mut handle = shared.lock()?;

        if handle.is_unbuffered() {
            return Err(Error::UnbufferedMode);
        }
        let rows = handle.num_rows();
        if offset >= rows {
            return Err(Error::InvalidOffset { offset, rows });
        }

        handle.data_seek(offset);
        Ok(())
    }

    /// Next column's metadata; advances the field cursor.
    pub fn fetch_field(&mut self) -> Result<Option<ColumnMetadata>> {
        let shared = self.shared()?;
        let field = shared.fields.get(self.field_pos).cloned();
        if field.is_some() {
            self.field_pos += 1;
        }
        Ok(field)
    }

    /// Metadata of column `index`; does not move the field cursor.
    pub fn fetch_field_direct(&self, index: usize) -> Result<Option<ColumnMetadata>> {
        Ok(self.shared()?.fields.get(index).cloned())
    }

    /// Metadata of every column.
    pub fn fetch_fields(&self) -> Result<Vec<ColumnMetadata>> {
        Ok(self.shared()?.fields.clone())
    }

    /// Next row's cells, copied and undecoded.
    pub fn fetch_row_raw(&mut self) -> Result<Option<Vec<Option<Bytes>>>> {
        let shared = self.shared()?;
        let mut handle = shared.lock()?;
        let cells = handle.fetch_row().map(|row| row.to_owned_row().into_cells());
        Ok(cells)
    }

    /// Cell lengths of the row most recently fetched.
    pub fn fetch_lengths(&self) -> Result<Option<Vec<u64>>> {
        let shared = self.shared()?;
        let handle = shared.lock()?;
        Ok(handle.fetch_lengths())
    }

    /// Move the field cursor to column `index`.
    pub fn field_seek(&mut self, index: usize) -> Result<()> {
        self.shared()?;
        if index >= self.field_count as usize {
            return Err(Error::InvalidFieldOffset {
                index,
                count: self.field_count as usize,
            });
        }
        self.field_pos = index;
        Ok(())
    }

    /// Field cursor position.
    pub fn field_tell(&self) -> Result<usize> {
        self.shared()?;
        Ok(self.field_pos)
    }

    /// Total row count. Not available for unbuffered results.
    pub fn num_rows(&self) -> Result<u64> {
        let shared = self.shared()?;
        let handle = shared.lock()?;
        if handle.is_unbuffered() {
            return Err(Error::UnbufferedMode);
        }
        Ok(handle.num_rows())
    }

    /// Whether rows are streamed from the server.
    pub fn is_unbuffered(&self) -> Result<bool> {
        let shared = self.shared()?;
        let handle = shared.lock()?;
        Ok(handle.is_unbuffered())
    }

    /// Whether [`free`](Self::free) has been called.
    pub fn is_freed(&self) -> bool {
        self.shared.is_none()
    }

    /// Free the result.
    ///
    /// The handle is released now, or when an in-flight async fetch
    /// completes. Calling this again does nothing.
    pub fn free(&mut self) {
        if let Some(shared) = self.shared.take() {
            tracing::debug!(
                holders = Arc::strong_count(&shared),
                "freeing result cursor"
            );
        }
    }
}
