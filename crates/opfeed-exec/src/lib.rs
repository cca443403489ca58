#![forbid(unsafe_code)]
//! opfeed-exec: operator contexts, bounded executors and a FIFO scheduler.
//!
//! Each operator context owns exactly one reader. Every scheduling step pulls
//! at most `tasks_per_step` bundles per context (downstream contexts first),
//! wraps them in tasks and queues them on executors. Nothing here blocks on
//! input: a context with no data simply yields no task this step.

pub mod context;
pub mod executor;
pub mod metrics;
pub mod operator;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod task;

pub use context::OperatorContext;
pub use executor::TaskExecutor;
pub use operator::{FnOperator, OpError, Operator};
pub use registry::OperatorRegistry;
pub use runtime::{Engine, ExecError, OperatorSpec, RunSummary};
pub use scheduler::{FifoScheduler, RunStats};
pub use task::Task;
