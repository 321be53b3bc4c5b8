//! Driver capabilities consumed by the result cursor.
//!
//! The cursor never talks to the network. It works against a
//! [`ResultHandle`] (one executed query's result set) and a
//! [`ConnectionHandle`] (used only to look up the error that cut a fetch
//! short). [`StoredResult`] is an in-process handle over owned rows, either
//! buffered (countable, seekable) or streamed.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::protocol::text::{ServerError, TextResultSet};
use crate::protocol::types::{ColumnMetadata, OwnedRow, RawRow};

/// A server result set, consumed row by row.
///
/// Implementations mirror the client library's result API. Rows returned by
/// [`fetch_row`](Self::fetch_row) borrow the handle's row buffer and are
/// valid until the next call.
pub trait ResultHandle: Send {
    /// Column metadata in select order. Never changes.
    fn fields(&self) -> &[ColumnMetadata];

    /// Whether rows are streamed from the server rather than buffered.
    fn is_unbuffered(&self) -> bool;

    /// Row count. For streamed results this is the number of rows read so far.
    fn num_rows(&self) -> u64;

    /// Index of the next row `fetch_row` will return.
    fn row_tell(&self) -> u64;

    /// Move the row cursor. Only meaningful for buffered results.
    fn data_seek(&mut self, offset: u64);

    /// Next row, or `None` at end of data (or when the stream failed).
    fn fetch_row(&mut self) -> Option<RawRow<'_>>;

    /// Cell lengths of the row last returned by `fetch_row`.
    fn fetch_lengths(&self) -> Option<Vec<u64>>;

    /// Free the result. Called exactly once.
    fn release(&mut self);
}

/// Error state of the connection that produced a result.
pub trait ConnectionHandle: Send + Sync {
    /// Last error number, 0 if none.
    fn errno(&self) -> u32;

    /// Last error message, empty if none.
    fn error(&self) -> String;
}

/// Settable connection error state.
#[derive(Debug, Default)]
pub struct SessionErrors {
    last: Mutex<(u32, String)>,
}

impl SessionErrors {
    /// Create an error state with no error recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn set_error(&self, code: u32, message: impl Into<String>) {
        let mut last = self.last.lock().unwrap_or_else(|p| p.into_inner());
        *last = (code, message.into());
    }

    /// Clear the recorded error.
    pub fn clear(&self) {
        self.set_error(0, "");
    }
}

impl ConnectionHandle for SessionErrors {
    fn errno(&self) -> u32 {
        self.last.lock().map(|l| l.0).unwrap_or_else(|p| p.into_inner().0)
    }

    fn error(&self) -> String {
        self.last
            .lock()
            .map(|l| l.1.clone())
            .unwrap_or_else(|p| p.into_inner().1.clone())
    }
}

/// How a result's rows are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMode {
    /// Whole result transferred up front.
    Buffered,
    /// Rows arrive incrementally.
    Streamed,
}

/// Stream interruption: after `after` rows the stream ends and `error` is
/// recorded on the session.
#[derive(Debug)]
struct Interruption {
    after: usize,
    session: Arc<SessionErrors>,
    error: ServerError,
}

/// In-process result handle over owned rows.
#[derive(Debug)]
pub struct StoredResult {
    fields: Vec<ColumnMetadata>,
    rows: Vec<OwnedRow>,
    mode: BufferMode,
    /// Next row to return.
    pos: usize,
    /// Row last returned by `fetch_row`.
    current: Option<usize>,
    interruption: Option<Interruption>,
    released: bool,
}

impl StoredResult {
    /// Create a buffered result. `max_length` of each column is computed
    /// from the rows, as the client library does when storing a result.
    pub fn buffered(fields: Vec<ColumnMetadata>, rows: Vec<OwnedRow>) -> Self {
        let mut fields = fields;
        for (i, field) in fields.iter_mut().enumerate() {
            field.max_length = rows
                .iter()
                .filter_map(|r| r.as_raw().get(i).flatten().map(|c| c.len() as u64))
                .max()
                .unwrap_or(0);
        }
        Self::with_mode(fields, rows, BufferMode::Buffered)
    }

    /// Create a streamed result.
    pub fn streamed(fields: Vec<ColumnMetadata>, rows: Vec<OwnedRow>) -> Self {
        Self::with_mode(fields, rows, BufferMode::Streamed)
    }

    fn with_mode(fields: Vec<ColumnMetadata>, rows: Vec<OwnedRow>, mode: BufferMode) -> Self {
        Self {
            fields,
            rows,
            mode,
            pos: 0,
            current: None,
            interruption: None,
            released: false,
        }
    }

    /// Build from a parsed text result set.
    ///
    /// A result set cut short by an ERR packet cannot be stored: buffered
    /// mode fails with the server error. Streamed mode yields the rows that
    /// arrived, then ends and records the error on `session`.
    pub fn from_text_result_set(
        result: TextResultSet,
        mode: BufferMode,
        session: Arc<SessionErrors>,
    ) -> Result<Self> {
        let TextResultSet {
            columns,
            rows,
            error,
        } = result;

        match (mode, error) {
            (BufferMode::Buffered, Some(err)) => {
                session.set_error(err.code, err.message.clone());
                Err(Error::partial_fetch(err.code, err.message))
            }
            (BufferMode::Buffered, None) => Ok(Self::buffered(columns, rows)),
            (BufferMode::Streamed, Some(err)) => {
                let after = rows.len();
                Ok(Self::streamed(columns, rows).interrupt_after(after, session, err))
            }
            (BufferMode::Streamed, None) => Ok(Self::streamed(columns, rows)),
        }
    }

    /// End the row stream after `after` rows and record `error` on `session`.
    ///
    /// `num_rows` of a buffered result still reports every row, which is
    /// how a short read shows up.
    pub fn interrupt_after(
        mut self,
        after: usize,
        session: Arc<SessionErrors>,
        error: ServerError,
    ) -> Self {
        self.interruption = Some(Interruption {
            after,
            session,
            error,
        });
        self
    }

    /// Buffering mode.
    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    /// Whether `release` has run.
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn row_limit(&self) -> usize {
        match &self.interruption {
            Some(i) => i.after.min(self.rows.len()),
            None => self.rows.len(),
        }
    }
}

impl ResultHandle for StoredResult {
    fn fields(&self) -> &[ColumnMetadata] {
        &self.fields
    }

    fn is_unbuffered(&self) -> bool {
        self.mode == BufferMode::Streamed
    }

    fn num_rows(&self) -> u64 {
        match self.mode {
            BufferMode::Buffered => self.rows.len() as u64,
            BufferMode::Streamed => self.pos as u64,
        }
    }

    fn row_tell(&self) -> u64 {
        self.pos as u64
    }

    fn data_seek(&mut self, offset: u64) {
        self.pos = (offset as usize).min(self.rows.len());
        self.current = None;
    }

    fn fetch_row(&mut self) -> Option<RawRow<'_>> {
        if self.released || self.pos >= self.row_limit() {
            self.current = None;
            if let Some(i) = &self.interruption {
                if self.pos >= i.after {
                    i.session.set_error(i.error.code, i.error.message.clone());
                }
            }
            return None;
        }

        let idx = self.pos;
        self.pos += 1;
        self.current = Some(idx);
        Some(self.rows[idx].as_raw())
    }

    fn fetch_lengths(&self) -> Option<Vec<u64>> {
        self.current.map(|idx| self.rows[idx].as_raw().lengths())
    }

    fn release(&mut self) {
        tracing::trace!(rows = self.rows.len(), "releasing stored result");
        self.rows.clear();
        self.current = None;
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::FieldType;
    use bytes::Bytes;

    fn rows(n: usize) -> Vec<OwnedRow> {
        (0..n)
            .map(|i| OwnedRow::new(vec![Some(Bytes::from(i.to_string()))]))
            .collect()
    }

    fn fields() -> Vec<ColumnMetadata> {
        vec![ColumnMetadata::new("id", FieldType::Long)]
    }

    #[test]
    fn test_buffered_walk_and_lengths() {
        let mut res = StoredResult::buffered(fields(), rows(12));
        assert_eq!(res.fields()[0].max_length, 2);
        assert_eq!(res.fetch_lengths(), None);

        let first = res.fetch_row().unwrap();
        assert_eq!(first.get(0), Some(Some(&b"0"[..])));
        assert_eq!(res.fetch_lengths(), Some(vec![1]));

        res.data_seek(11);
        assert_eq!(res.fetch_lengths(), None);
        assert!(res.fetch_row().is_some());
        assert_eq!(res.fetch_lengths(), Some(vec![2]));
        assert!(res.fetch_row().is_none());
        assert_eq!(res.num_rows(), 12);
    }

    #[test]
    fn test_streamed_counts_rows_read() {
        let mut res = StoredResult::streamed(fields(), rows(3));
        assert!(res.is_unbuffered());
        assert_eq!(res.num_rows(), 0);
        while res.fetch_row().is_some() {}
        assert_eq!(res.num_rows(), 3);
    }

    #[test]
    fn test_interruption_records_session_error() {
        let session = Arc::new(SessionErrors::new());
        let err = ServerError {
            code: 2013,
            sql_state: None,
            message: "Lost connection".to_string(),
        };
        let mut res =
            StoredResult::buffered(fields(), rows(10)).interrupt_after(9, session.clone(), err);

        let mut n = 0;
        while res.fetch_row().is_some() {
            n += 1;
        }
        assert_eq!(n, 9);
        assert_eq!(res.num_rows(), 10);
        assert_eq!(session.errno(), 2013);
        assert_eq!(session.error(), "Lost connection");
    }

    #[test]
    fn test_from_text_result_set_buffered_error() {
        let session = Arc::new(SessionErrors::new());
        let rs = TextResultSet {
            columns: fields(),
            rows: rows(1),
            error: Some(ServerError {
                code: 1317,
                sql_state: Some("70100".to_string()),
                message: "Query execution was interrupted".to_string(),
            }),
        };
        let err = StoredResult::from_text_result_set(rs, BufferMode::Buffered, session.clone())
            .err()
            .unwrap();
        assert!(matches!(err, Error::PartialFetch { code: 1317, .. }));
        assert_eq!(session.errno(), 1317);
    }

    #[test]
    fn test_release() {
        let mut res = StoredResult::buffered(fields(), rows(2));
        res.release();
        assert!(res.is_released());
        assert!(res.fetch_row().is_none());
    }
}
