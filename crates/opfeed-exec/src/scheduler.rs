//! FIFO task scheduler.
//!
//! Each step walks the operator contexts from last to first, so operators near
//! the end of a pipeline drain before their producers add more work. A task
//! goes to the least busy executor already serving its operator; if none has
//! room a new executor is enlisted for that operator.

use std::collections::HashMap;

use opfeed_core::config::EngineConfig;
use opfeed_core::id::ExecutorId;

use crate::context::OperatorContext;
use crate::executor::TaskExecutor;
use crate::metrics::emit_span;
use crate::runtime::ExecError;

/// Counters from one `run_until_idle` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub steps: u64,
    pub tasks_executed: u64,
    /// Every context reached end of stream.
    pub finished: bool,
}

pub struct FifoScheduler {
    executors: Vec<TaskExecutor>,
    contexts: Vec<OperatorContext>,
    /// Operator key -> indices of executors that have run it.
    op_exec_map: HashMap<String, Vec<usize>>,
    tasks_per_step: usize,
}

impl FifoScheduler {
    pub fn new(cfg: &EngineConfig) -> Self {
        let executors = (0..cfg.num_executors.max(1))
            .map(|i| TaskExecutor::new(ExecutorId::new(i as u64), cfg.max_tasks_per_executor))
            .collect();
        Self {
            executors,
            contexts: Vec::new(),
            op_exec_map: HashMap::new(),
            tasks_per_step: cfg.tasks_per_step.max(1),
        }
    }

    /// Contexts are scheduled in reverse insertion order; add producers first.
    pub fn add_context(&mut self, ctx: OperatorContext) {
        self.contexts.push(ctx);
    }

    pub fn contexts(&self) -> &[OperatorContext] {
        &self.contexts
    }

    pub fn executors(&self) -> &[TaskExecutor] {
        &self.executors
    }

    /// Executor indices that have been assigned `op_key`.
    pub fn executors_for(&self, op_key: &str) -> &[usize] {
        self.op_exec_map
            .get(op_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// One pass over all contexts. Returns the number of tasks queued.
    pub fn schedule_step(&mut self) -> Result<usize, ExecError> {
        let mut scheduled = 0;
        for ci in (0..self.contexts.len()).rev() {
            for _ in 0..self.tasks_per_step {
                let key = self.contexts[ci].key().to_string();
                let Some(ei) = self.find_optimal_exec(&key) else {
                    // Every executor is full; leftover input waits for the next step.
                    break;
                };
                let Some(task) = self.contexts[ci].pop_ready_tasks(1)?.pop() else {
                    break;
                };
                if let Err(task) = self.executors[ei].push_task(task) {
                    self.contexts[ci].requeue(task);
                    break;
                }
                self.assign(&key, ei);
                scheduled += 1;
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(scheduled, contexts = self.contexts.len(), "schedule step");
        Ok(scheduled)
    }

    /// Least busy executor that already runs `op_key` and has room; otherwise
    /// the least busy executor with room. `None` when all are full.
    fn find_optimal_exec(&self, op_key: &str) -> Option<usize> {
        let least_busy = |candidates: &mut dyn Iterator<Item = usize>| {
            candidates
                .filter(|&i| self.executors[i].has_capacity())
                .min_by_key(|&i| (self.executors[i].num_tasks(), i))
        };
        least_busy(&mut self.executors_for(op_key).iter().copied())
            .or_else(|| least_busy(&mut (0..self.executors.len())))
    }

    fn assign(&mut self, op_key: &str, exec: usize) {
        let execs = self.op_exec_map.entry(op_key.to_string()).or_default();
        if !execs.contains(&exec) {
            #[cfg(feature = "tracing")]
            tracing::trace!(op = op_key, executor = exec, "executor assigned");
            execs.push(exec);
        }
    }

    /// Run everything queued on every executor.
    pub fn drain_executors(&mut self) -> Result<usize, ExecError> {
        let mut ran = 0;
        for exec in &mut self.executors {
            ran += exec.run_pending()?;
        }
        Ok(ran)
    }

    pub fn all_finished(&self) -> bool {
        self.contexts.iter().all(OperatorContext::is_finished)
    }

    /// Alternate scheduling steps and executor drains until every context is
    /// finished, or `max_idle_steps` consecutive steps make no progress
    /// (upstream data not yet appended).
    pub fn run_until_idle(&mut self, max_idle_steps: usize) -> Result<RunStats, ExecError> {
        let mut stats = RunStats::default();
        let mut idle = 0;
        loop {
            let scheduled = self.schedule_step()?;
            let executed = self.drain_executors()?;
            stats.steps += 1;
            stats.tasks_executed += executed as u64;

            // Executors are drained, so a finished context has no work in flight.
            for ctx in &self.contexts {
                if ctx.is_finished() {
                    ctx.seal_output()?;
                }
            }

            if self.all_finished() {
                stats.finished = true;
                break;
            }
            if scheduled == 0 && executed == 0 {
                idle += 1;
                if idle >= max_idle_steps.max(1) {
                    break;
                }
            } else {
                idle = 0;
            }
        }
        emit_span(
            "run_until_idle",
            &[
                ("steps", stats.steps.to_string()),
                ("tasks_executed", stats.tasks_executed.to_string()),
                ("finished", stats.finished.to_string()),
            ],
        );
        Ok(stats)
    }
}
