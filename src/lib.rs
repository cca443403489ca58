#![forbid(unsafe_code)]
//! opfeed: pull named operator inputs out of append-only column stores.
//!
//! Facade over the workspace crates:
//! - [`types`]: values, rows, schemas, config, explicit reprs.
//! - [`store`]: the append-only column store and its cursors.
//! - [`reader`]: input projection and the row/batch/window readers.
//! - [`exec`]: operator contexts, executors and the FIFO scheduler.

pub use opfeed_core as types;
pub use opfeed_exec as exec;
pub use opfeed_reader as reader;
pub use opfeed_store as store;

/// Convenient re-exports for applications.
pub mod prelude {
    pub use opfeed_core::prelude::*;
    pub use opfeed_exec::{Engine, ExecError, FnOperator, OpError, Operator, OperatorSpec};
    pub use opfeed_reader::{
        build_reader, ColumnIndexMap, InputBundle, ReadOutput, Reader, ReaderError, ReaderState,
    };
    pub use opfeed_store::{ColumnStore, Pull, RowCursor, StoreError};
}
