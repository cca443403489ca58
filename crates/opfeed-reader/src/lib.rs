#![forbid(unsafe_code)]
//! opfeed-reader: turn a row cursor into named operator inputs.
//!
//! Design intent:
//! - One reader per operator context; readers are `Send` but not shared.
//! - `read()` never blocks. No row available right now and end of stream
//!   both come back as `ReadOutput::EndOfStream`; `Reader::state` tells the
//!   two apart.
//! - Every strategy shares the same `read`/`size` contract and the same
//!   projector, so adding a strategy never touches callers.

pub mod batch;
pub mod bundle;
pub mod error;
pub mod factory;
pub mod map;
pub mod projector;
pub mod traits;
pub mod window;

pub use batch::BatchReader;
pub use bundle::InputBundle;
pub use error::{ReaderError, Result};
pub use factory::{build_reader, ReaderKind};
pub use map::RowReader;
pub use projector::{project, ColumnIndexMap};
pub use traits::{ReadOutput, Reader, ReaderState};
pub use window::WindowReader;
