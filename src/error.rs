//! Error types for result-set materialization.

use std::panic::Location;
use thiserror::Error;

/// Result type alias for result-set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for result-set operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The result handle has already been released.
    #[error("Result has been freed")]
    FreedResult,

    /// Row counting or seeking on a streamed (unbuffered) result.
    #[error("Function cannot be used with an unbuffered result")]
    UnbufferedMode,

    /// Row seek target past the end of the result.
    #[error("Invalid row offset {offset} (rows: {rows})")]
    InvalidOffset { offset: u64, rows: u64 },

    /// Field seek target past the last column.
    #[error("Invalid field offset {index} (fields: {count})")]
    InvalidFieldOffset { index: usize, count: usize },

    /// Conflicting fetch options.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Fewer rows were retrieved than the result reports.
    #[error("Fetch error #{code}: {message}")]
    PartialFetch { code: u32, message: String },

    /// Malformed text-protocol packet.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Buffer too small.
    #[error("Buffer too small: need {needed} bytes, have {available} at {location}")]
    BufferTooSmall { needed: usize, available: usize, location: &'static Location<'static> },

    /// Async entry point used outside a runtime, or the worker task failed.
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    /// A handle implementation panicked while the result was locked.
    #[error("Result handle lock poisoned")]
    HandlePoisoned,
}

impl Error {
    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a partial fetch error from the connection's error state.
    pub fn partial_fetch(code: u32, message: impl Into<String>) -> Self {
        Self::PartialFetch {
            code,
            message: message.into(),
        }
    }

    /// Create a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}
