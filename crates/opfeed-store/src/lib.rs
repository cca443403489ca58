#![forbid(unsafe_code)]
//! opfeed-store: append-only column store plus the cursor readers pull from.
//!
//! One producer appends, any number of cursors pull. Cursors are monotonic:
//! they never rewind and never observe a row twice.

pub mod cursor;
pub mod error;
pub mod store;

pub use cursor::{MapCursor, Pull, RowCursor};
pub use error::{Result, StoreError};
pub use store::ColumnStore;
