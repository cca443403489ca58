//! Runtime: wire stores, readers and operators into contexts and run them.
//!
//! Behavior:
//! - Operators come from the `OperatorRegistry` (or are handed in directly).
//! - Each operator gets exactly one reader over its input store.
//! - Output stores are sealed once their producing context is finished, so a
//!   chain of operators drains end to end in one `run()`.
//! - An output store must have a single producing context.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use opfeed_core::config::{EngineConfig, ReaderKind};
use opfeed_core::id::OpId;
use opfeed_core::repr::{Describe, Repr};
use opfeed_reader::{build_reader, ColumnIndexMap, ReaderError};
use opfeed_store::{ColumnStore, StoreError};

use crate::context::OperatorContext;
use crate::operator::{OpError, Operator};
use crate::registry::OperatorRegistry;
use crate::scheduler::{FifoScheduler, RunStats};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("operator definition not found: {0}")]
    OperatorNotFound(String),

    #[error("operator '{op}' failed: {source}")]
    Operator {
        op: String,
        #[source]
        source: OpError,
    },

    #[error("reader: {0}")]
    Reader(#[from] ReaderError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(#[from] opfeed_core::Error),

    #[error("invalid pipeline: {0}")]
    Invalid(String),
}

/// How to bind one operator into the engine.
#[derive(Clone)]
pub struct OperatorSpec {
    /// Registry function path, e.g. `builtin/add`.
    pub function: String,
    pub args: Value,
    pub input: ColumnStore,
    /// `(input name, column name)` pairs the operator wants.
    pub inputs: Vec<(String, String)>,
    /// Overrides the engine's default reader.
    pub reader: Option<ReaderKind>,
    pub output: Option<ColumnStore>,
}

impl OperatorSpec {
    pub fn new(function: impl Into<String>, input: &ColumnStore) -> Self {
        Self {
            function: function.into(),
            args: Value::Null,
            input: input.clone(),
            inputs: Vec::new(),
            reader: None,
            output: None,
        }
    }

    pub fn args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// Feed column `column` to the operator as input `name`.
    pub fn input(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.inputs.push((name.into(), column.into()));
        self
    }

    pub fn reader(mut self, kind: ReaderKind) -> Self {
        self.reader = Some(kind);
        self
    }

    pub fn output(mut self, store: &ColumnStore) -> Self {
        self.output = Some(store.clone());
        self
    }
}

/// Result of one `Engine::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub tasks_executed: u64,
    pub finished: bool,
    pub engine_version: String,
}

impl From<RunStats> for RunSummary {
    fn from(s: RunStats) -> Self {
        Self {
            steps: s.steps,
            tasks_executed: s.tasks_executed,
            finished: s.finished,
            engine_version: opfeed_core::VERSION.to_string(),
        }
    }
}

/// Engine owns the config, operator registry, and scheduler.
pub struct Engine {
    cfg: EngineConfig,
    registry: OperatorRegistry,
    scheduler: FifoScheduler,
    next_op: OpId,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Result<Self, ExecError> {
        Self::with_registry(cfg, OperatorRegistry::with_builtins())
    }

    pub fn with_registry(cfg: EngineConfig, registry: OperatorRegistry) -> Result<Self, ExecError> {
        cfg.validate()?;
        let scheduler = FifoScheduler::new(&cfg);
        Ok(Self {
            cfg,
            registry,
            scheduler,
            next_op: OpId::new(0),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn registry_mut(&mut self) -> &mut OperatorRegistry {
        &mut self.registry
    }

    pub fn scheduler(&self) -> &FifoScheduler {
        &self.scheduler
    }

    /// Load `spec.function` from the registry and bind it. Add producers
    /// before their consumers.
    pub fn add_operator(&mut self, spec: OperatorSpec) -> Result<OpId, ExecError> {
        let operator = self.registry.load(&spec.function, &spec.args)?;
        self.add_instance(spec, operator)
    }

    /// Bind an already constructed operator; `spec.function` is only its key.
    pub fn add_instance(
        &mut self,
        spec: OperatorSpec,
        operator: Arc<dyn Operator>,
    ) -> Result<OpId, ExecError> {
        if let Some(out) = &spec.output {
            if out.is_sealed()? {
                return Err(ExecError::Invalid(format!(
                    "output store of '{}' is already sealed",
                    spec.function
                )));
            }
            let taken = self
                .scheduler
                .contexts()
                .iter()
                .find(|ctx| ctx.output().is_some_and(|o| o.same_store(out)));
            if let Some(owner) = taken {
                return Err(ExecError::Invalid(format!(
                    "output store of '{}' is already written by {} ('{}')",
                    spec.function,
                    owner.id(),
                    owner.key()
                )));
            }
        }
        let index_map = ColumnIndexMap::resolve(spec.input.schema(), spec.inputs.iter().cloned())?;
        let kind = spec.reader.unwrap_or(self.cfg.default_reader);
        let reader = build_reader(kind, &spec.input, index_map)?;

        let id = self.next_op;
        self.next_op = id.next();
        #[cfg(feature = "tracing")]
        tracing::debug!(op = %id, function = %spec.function, reader = kind.name(), "operator bound");
        self.scheduler.add_context(OperatorContext::new(
            id,
            spec.function,
            reader,
            operator,
            spec.output,
        ));
        Ok(id)
    }

    /// Run until every operator is finished or no progress can be made.
    ///
    /// Calling `run` again later picks up rows appended in the meantime.
    pub fn run(&mut self) -> Result<RunSummary, ExecError> {
        let stats = self.scheduler.run_until_idle(self.cfg.max_idle_steps)?;
        Ok(stats.into())
    }
}

impl Describe for Engine {
    fn describe(&self) -> Repr {
        let repr = Repr::new("Engine").nested("config", self.cfg.describe());
        self.scheduler
            .contexts()
            .iter()
            .fold(repr, |r, ctx| r.nested(&ctx.id().to_string(), ctx.describe()))
    }
}
