//! Convenient re-exports for downstream crates.

pub use crate::config::{EngineConfig, ReaderKind};
pub use crate::error::{Error, Result};
pub use crate::id::{ExecutorId, OpId, TaskId};
pub use crate::repr::{Describe, Repr};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::types::{Column, Row, Scalar, Tensor};
