//! Full-result and single-row materialization.
//!
//! Every fetch runs the same routine, [`materialize_rows`]: pull raw rows
//! from a [`RowSource`], decode each cell, shape the row. The sync paths
//! feed it straight from the live handle. The async path splits the work:
//! a blocking worker walks the handle and copies rows out, then the
//! awaiting task decodes and shapes them.
//!
//! A walk that ends before a buffered result's row count, or a streamed walk
//! that ends with an error on the connection, fails with
//! [`Error::PartialFetch`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cursor::{ResultCursor, SharedResult};
use crate::error::{Error, Result};
use crate::handle::{ConnectionHandle, ResultHandle};
use crate::protocol::decode::decode_row;
use crate::protocol::types::{ColumnMetadata, OwnedRow, RawRow};
use crate::shape::{shape_row, FetchOptions, RowShape, ShapedRow};

/// A source of raw rows.
pub trait RowSource {
    /// Next row, or `None` when exhausted.
    fn next_row(&mut self) -> Option<RawRow<'_>>;
}

impl RowSource for Box<dyn ResultHandle> {
    fn next_row(&mut self) -> Option<RawRow<'_>> {
        self.fetch_row()
    }
}

/// Rows already copied out of a handle.
#[derive(Debug, Default)]
pub struct BufferedRows {
    rows: Vec<OwnedRow>,
    pos: usize,
}

impl BufferedRows {
    pub fn new(rows: Vec<OwnedRow>) -> Self {
        Self { rows, pos: 0 }
    }
}

impl RowSource for BufferedRows {
    fn next_row(&mut self) -> Option<RawRow<'_>> {
        let row = self.rows.get(self.pos)?;
        self.pos += 1;
        Some(row.as_raw())
    }
}

/// Decode and shape every remaining row of `source`.
pub fn materialize_rows(
    source: &mut dyn RowSource,
    columns: &[ColumnMetadata],
    shape: RowShape,
) -> Vec<ShapedRow> {
    let mut rows = Vec::new();
    while let Some(raw) = source.next_row() {
        let values = decode_row(columns, raw.iter());
        rows.push(shape_row(columns, values, shape));
        tracing::trace!(row = rows.len(), "row materialized");
    }
    rows
}

/// Rows and column metadata of a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedResult {
    /// Shaped rows.
    pub rows: Vec<ShapedRow>,
    /// Column metadata.
    pub fields: Vec<ColumnMetadata>,
}

impl FetchedResult {
    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|c| c.name.as_str()).collect()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &ShapedRow> {
        self.rows.iter()
    }
}

impl IntoIterator for FetchedResult {
    type Item = ShapedRow;
    type IntoIter = std::vec::IntoIter<ShapedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Future of an async fetch-all.
///
/// The row walk runs on a blocking worker whether or not this future is
/// polled. Dropping it does not cancel the walk; the result stays alive
/// until the worker finishes.
pub struct FetchAll {
    shared: Option<Arc<SharedResult>>,
    shape: RowShape,
    walk: JoinHandle<Result<Vec<OwnedRow>>>,
}

impl Future for FetchAll {
    type Output = Result<FetchedResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let joined = ready!(Pin::new(&mut self.walk).poll(cx));

        let Some(shared) = self.shared.take() else {
            return Poll::Ready(Err(Error::runtime("FetchAll polled after completion")));
        };
        let rows = match joined {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => return Poll::Ready(Err(e)),
            Err(e) => {
                return Poll::Ready(Err(Error::runtime(format!("Fetch worker failed: {}", e))))
            }
        };

        let mut source = BufferedRows::new(rows);
        let rows = materialize_rows(&mut source, &shared.fields, self.shape);
        tracing::debug!(rows = rows.len(), "async fetch completed");

        Poll::Ready(Ok(FetchedResult {
            rows,
            fields: shared.fields.clone(),
        }))
    }
}

/// Copy every remaining row out of the handle.
fn walk_rows(shared: &SharedResult) -> Result<Vec<OwnedRow>> {
    let mut handle = shared.lock()?;
    let start = handle.row_tell();

    let mut rows = Vec::new();
    while let Some(row) = handle.fetch_row() {
        rows.push(row.to_owned_row());
    }

    check_complete(rows.len(), start, &**handle, shared.connection.as_ref())?;
    Ok(rows)
}

/// Fail if a walk that began at row `start` stopped short.
///
/// A buffered result knows its row count, so the count decides. A streamed
/// result only counts what it read; a short read there shows up as an error
/// on the connection.
fn check_complete(
    fetched: usize,
    start: u64,
    handle: &dyn ResultHandle,
    connection: &dyn ConnectionHandle,
) -> Result<()> {
    let expected = handle.num_rows().saturating_sub(start);
    let errno = connection.errno();
    let complete = if handle.is_unbuffered() {
        errno == 0
    } else {
        fetched as u64 == expected
    };
    if complete {
        return Ok(());
    }

    let message = connection.error();
    tracing::warn!(
        fetched,
        expected,
        errno,
        error = %message,
        "fetch ended before the end of the result"
    );
    Err(Error::partial_fetch(errno, message))
}

impl ResultCursor {
    /// Fetch every remaining row on the calling thread.
    pub fn fetch_all(&mut self, options: FetchOptions) -> Result<Vec<ShapedRow>> {
        let shape = RowShape::from_options(&options)?;
        let shared = self.shared()?;
        let mut handle = shared.lock()?;
        let start = handle.row_tell();

        let rows = materialize_rows(&mut *handle, &shared.fields, shape);
        check_complete(rows.len(), start, &**handle, shared.connection.as_ref())?;

        tracing::debug!(rows = rows.len(), ?shape, "fetch completed");
        Ok(rows)
    }

    /// Fetch every remaining row without blocking the caller.
    ///
    /// Options and validity are checked before any work starts. The row walk
    /// is handed to the runtime's blocking pool immediately; decoding happens
    /// when the returned future is polled. Must be called from within a Tokio
    /// runtime.
    ///
    /// The result is kept alive for the duration of the fetch, so calling
    /// [`free`](ResultCursor::free) meanwhile is safe.
    pub fn fetch_all_async(&self, options: FetchOptions) -> Result<FetchAll> {
        let shape = RowShape::from_options(&options)?;
        let shared = Arc::clone(self.shared()?);
        let runtime = Handle::try_current().map_err(|e| Error::runtime(e.to_string()))?;

        let worker = Arc::clone(&shared);
        let walk = runtime.spawn_blocking(move || walk_rows(&worker));
        tracing::debug!(?shape, "async fetch started");

        Ok(FetchAll {
            shared: Some(shared),
            shape,
            walk,
        })
    }

    /// Fetch every remaining row in the background and hand the outcome to
    /// `callback`.
    ///
    /// Errors in options or validity are returned here and the callback is
    /// not invoked. Otherwise the callback runs exactly once, on a runtime
    /// task. The result is not released before the callback returns.
    pub fn fetch_all_with<F>(&self, options: FetchOptions, callback: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<FetchedResult>) + Send + 'static,
    {
        let fetch = self.fetch_all_async(options)?;
        let keep = Arc::clone(self.shared()?);
        let runtime = Handle::try_current().map_err(|e| Error::runtime(e.to_string()))?;
        Ok(runtime.spawn(async move {
            callback(fetch.await);
            drop(keep);
        }))
    }

    /// Fetch the next row, or `None` at end of data.
    pub fn fetch_row(&mut self, options: FetchOptions) -> Result<Option<ShapedRow>> {
        let shape = RowShape::from_options(&options)?;
        let shared = self.shared()?;
        let mut handle = shared.lock()?;

        let row = handle.fetch_row().map(|raw| {
            let values = decode_row(&shared.fields, raw.iter());
            shape_row(&shared.fields, values, shape)
        });
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{SessionErrors, StoredResult};
    use crate::protocol::text::ServerError;
    use crate::protocol::types::{FieldType, MysqlValue};
    use bytes::Bytes;

    fn fields() -> Vec<ColumnMetadata> {
        vec![
            ColumnMetadata::new("id", FieldType::Long).with_table("t1"),
            ColumnMetadata::new("name", FieldType::VarString).with_table("t1"),
        ]
    }

    fn rows(n: usize) -> Vec<OwnedRow> {
        (0..n)
            .map(|i| {
                OwnedRow::new(vec![
                    Some(Bytes::from((i + 1).to_string())),
                    Some(Bytes::from_static(b"a")),
                ])
            })
            .collect()
    }

    fn cursor(result: StoredResult, session: Arc<SessionErrors>) -> ResultCursor {
        ResultCursor::new(session, Box::new(result))
    }

    #[test]
    fn test_materialize_buffered_rows() {
        let mut source = BufferedRows::new(rows(2));
        let shaped = materialize_rows(&mut source, &fields(), RowShape::Array);
        assert_eq!(shaped.len(), 2);
        assert_eq!(
            shaped[1],
            ShapedRow::Array(vec![MysqlValue::Int(2), MysqlValue::String("a".to_string())])
        );
        assert!(source.next_row().is_none());
    }

    #[test]
    fn test_fetch_all_sync() {
        let session = Arc::new(SessionErrors::new());
        let mut cursor = cursor(StoredResult::buffered(fields(), rows(3)), session);
        let rows = cursor.fetch_all(FetchOptions::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_object().unwrap()["id"], MysqlValue::Int(1));
    }

    #[test]
    fn test_fetch_all_after_fetch_row_is_complete() {
        let session = Arc::new(SessionErrors::new());
        let mut cursor = cursor(StoredResult::buffered(fields(), rows(3)), session);
        assert!(cursor.fetch_row(FetchOptions::default()).unwrap().is_some());
        let rest = cursor.fetch_all(FetchOptions::default()).unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_fetch_all_sync_partial() {
        let session = Arc::new(SessionErrors::new());
        let err = ServerError {
            code: 2013,
            sql_state: None,
            message: "Lost connection to MySQL server during query".to_string(),
        };
        let result =
            StoredResult::buffered(fields(), rows(10)).interrupt_after(9, session.clone(), err);
        let mut cursor = cursor(result, session);

        let err = cursor.fetch_all(FetchOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Fetch error #2013: Lost connection to MySQL server during query"
        );
    }

    #[test]
    fn test_stale_connection_error_does_not_fail_buffered_fetch() {
        let session = Arc::new(SessionErrors::new());
        session.set_error(2013, "Lost connection to MySQL server during query");
        let mut cursor = cursor(StoredResult::buffered(fields(), rows(3)), session);

        let rows = cursor.fetch_all(FetchOptions::default()).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_streamed_fetch_fails_on_connection_error() {
        let session = Arc::new(SessionErrors::new());
        let err = ServerError {
            code: 2013,
            sql_state: None,
            message: "Lost connection to MySQL server during query".to_string(),
        };
        let result =
            StoredResult::streamed(fields(), rows(5)).interrupt_after(2, session.clone(), err);
        let mut cursor = cursor(result, session);

        assert!(matches!(
            cursor.fetch_all(FetchOptions::default()),
            Err(Error::PartialFetch { code: 2013, .. })
        ));
    }

    #[test]
    fn test_fetch_row_shapes() {
        let session = Arc::new(SessionErrors::new());
        let mut cursor = cursor(StoredResult::buffered(fields(), rows(1)), session);

        let row = cursor
            .fetch_row(FetchOptions::new().with_nest_tables(true))
            .unwrap()
            .unwrap();
        assert_eq!(
            row.as_nested().unwrap()["t1"]["name"],
            MysqlValue::String("a".to_string())
        );
        assert!(cursor.fetch_row(FetchOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_configuration_checked_first() {
        let session = Arc::new(SessionErrors::new());
        let mut cursor = cursor(StoredResult::buffered(fields(), rows(1)), session);
        let both = FetchOptions::new().with_as_array(true).with_nest_tables(true);

        assert!(matches!(cursor.fetch_row(both), Err(Error::Configuration { .. })));
        assert!(matches!(cursor.fetch_all(both), Err(Error::Configuration { .. })));
        assert!(matches!(cursor.fetch_all_async(both), Err(Error::Configuration { .. })));

        // nothing was consumed
        assert_eq!(cursor.fetch_all(FetchOptions::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_all_async_outside_runtime() {
        let session = Arc::new(SessionErrors::new());
        let cursor = cursor(StoredResult::buffered(fields(), rows(1)), session);
        assert!(matches!(
            cursor.fetch_all_async(FetchOptions::default()),
            Err(Error::Runtime { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_async() {
        let session = Arc::new(SessionErrors::new());
        let cursor = cursor(StoredResult::buffered(fields(), rows(4)), session);

        let fetched = cursor
            .fetch_all_async(FetchOptions::new().with_as_array(true))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(fetched.len(), 4);
        assert_eq!(fetched.column_names(), vec!["id", "name"]);
        assert_eq!(fetched.rows[3].as_array().unwrap()[0], MysqlValue::Int(4));
    }
}
