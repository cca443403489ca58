//! Engine and reader configuration that downstream crates can serialize/deserialize.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repr::{Describe, Repr};

/// Reading strategy bound to an operator context.
///
/// Closed set: every variant has exactly one reader implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReaderKind {
    /// One row per `read()`.
    #[default]
    Map,
    /// Up to `size` currently available rows per `read()`.
    Batch { size: usize },
    /// Sliding windows of `size` rows advancing by `step`.
    Window { size: usize, step: usize },
}

impl ReaderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReaderKind::Map => "map",
            ReaderKind::Batch { .. } => "batch",
            ReaderKind::Window { .. } => "window",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ReaderKind::Map => Ok(()),
            ReaderKind::Batch { size } if size == 0 => {
                Err(Error::Config("batch size must be at least 1".into()))
            }
            ReaderKind::Window { size, step } if size == 0 || step == 0 => Err(Error::Config(
                format!("window size and step must be at least 1 (size={size}, step={step})"),
            )),
            _ => Ok(()),
        }
    }
}

/// Parses `map`, `batch:<size>` or `window:<size>:<step>`.
impl FromStr for ReaderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let num = |p: &str| {
            p.parse::<usize>()
                .map_err(|e| Error::Config(format!("reader spec '{s}': {e}")))
        };
        let kind = match parts.as_slice() {
            ["map"] => ReaderKind::Map,
            ["batch", size] => ReaderKind::Batch { size: num(*size)? },
            ["window", size, step] => ReaderKind::Window {
                size: num(*size)?,
                step: num(*step)?,
            },
            _ => return Err(Error::Config(format!("unknown reader spec '{s}'"))),
        };
        kind.validate()?;
        Ok(kind)
    }
}

impl Describe for ReaderKind {
    fn describe(&self) -> Repr {
        let repr = Repr::new("ReaderKind").field("kind", self.name());
        match *self {
            ReaderKind::Map => repr,
            ReaderKind::Batch { size } => repr.field("size", size),
            ReaderKind::Window { size, step } => repr.field("size", size).field("step", step),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of task executors the scheduler spreads work over.
    pub num_executors: usize,

    /// Queue capacity per executor; a full executor gets no further tasks.
    pub max_tasks_per_executor: usize,

    /// Tasks popped from each operator context per scheduling step.
    pub tasks_per_step: usize,

    /// Consecutive steps without progress before `run_until_idle` gives up.
    pub max_idle_steps: usize,

    /// Reader used when an operator does not request one.
    pub default_reader: ReaderKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_executors: 4,
            max_tasks_per_executor: 10,
            tasks_per_step: 1,
            max_idle_steps: 3,
            default_reader: ReaderKind::Map,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `OPFEED_NUM_EXECUTORS`
    /// - `OPFEED_MAX_TASKS_PER_EXECUTOR`
    /// - `OPFEED_TASKS_PER_STEP`
    /// - `OPFEED_MAX_IDLE_STEPS`
    /// - `OPFEED_READER`: `map`, `batch:<size>` or `window:<size>:<step>`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("OPFEED_NUM_EXECUTORS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.num_executors = v;
            }
        }

        if let Ok(s) = std::env::var("OPFEED_MAX_TASKS_PER_EXECUTOR") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_tasks_per_executor = v;
            }
        }

        if let Ok(s) = std::env::var("OPFEED_TASKS_PER_STEP") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.tasks_per_step = v;
            }
        }

        if let Ok(s) = std::env::var("OPFEED_MAX_IDLE_STEPS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_idle_steps = v;
            }
        }

        if let Ok(s) = std::env::var("OPFEED_READER") {
            if let Ok(v) = s.parse::<ReaderKind>() {
                cfg.default_reader = v;
            }
        }

        cfg
    }

    /// Parse a YAML document; missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_executors == 0 {
            return Err(Error::Config("num_executors must be at least 1".into()));
        }
        if self.max_tasks_per_executor == 0 {
            return Err(Error::Config(
                "max_tasks_per_executor must be at least 1".into(),
            ));
        }
        if self.tasks_per_step == 0 {
            return Err(Error::Config("tasks_per_step must be at least 1".into()));
        }
        self.default_reader.validate()
    }
}

impl Describe for EngineConfig {
    fn describe(&self) -> Repr {
        Repr::new("EngineConfig")
            .field("num_executors", self.num_executors)
            .field("max_tasks_per_executor", self.max_tasks_per_executor)
            .field("tasks_per_step", self.tasks_per_step)
            .field("max_idle_steps", self.max_idle_steps)
            .nested("default_reader", self.default_reader.describe())
    }
}
