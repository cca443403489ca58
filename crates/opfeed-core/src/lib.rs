#![forbid(unsafe_code)]
//! opfeed-core: values, rows, schemas, ids, config, and explicit reprs.
//!
//! Everything here is plain data. Stores, cursors and readers live in the
//! crates layered on top, so any of them can depend on core without pulling
//! in locking or scheduling code.

pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod repr;
pub mod schema;
pub mod types;

pub use error::{Error, Result};

/// Crate version, surfaced in run summaries.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
