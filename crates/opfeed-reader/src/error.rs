use opfeed_store::StoreError;
use thiserror::Error;

/// Result type local to opfeed-reader.
pub type Result<T> = std::result::Result<T, ReaderError>;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("input name '{0}' declared more than once")]
    DuplicateInput(String),

    #[error("input '{input}' wants column '{column}', which the store does not have")]
    UnknownColumn { input: String, column: String },

    #[error("input '{input}' maps to column {index} but rows only have {width} columns")]
    IndexOutOfRange {
        input: String,
        index: usize,
        width: usize,
    },

    #[error("reader config: {0}")]
    Config(#[from] opfeed_core::Error),

    /// Faults from the underlying cursor, passed through untouched.
    #[error(transparent)]
    Cursor(#[from] StoreError),
}
