use thiserror::Error;

/// Result type local to opfeed-store.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row has {got} values but the store has {expected} columns")]
    Arity { expected: usize, got: usize },

    #[error("store is sealed; no further appends are accepted")]
    Sealed,

    #[error("store lock poisoned by a panicked writer")]
    Poisoned,

    #[error("store corrupted: {0}")]
    Corrupt(String),
}
