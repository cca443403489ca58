//! Task executors: a bounded FIFO of tasks drained on demand.

use std::collections::VecDeque;

use opfeed_core::id::ExecutorId;

use crate::runtime::ExecError;
use crate::task::Task;

/// Bounded FIFO; pushing into a full queue hands the value back.
pub struct BoundedQueue<T> {
    cap: usize,
    q: VecDeque<T>,
}

impl<T> BoundedQueue<T> {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            q: VecDeque::new(),
        }
    }

    pub fn try_push(&mut self, v: T) -> Result<(), T> {
        if self.q.len() >= self.cap {
            Err(v)
        } else {
            self.q.push_back(v);
            Ok(())
        }
    }

    pub fn try_pop(&mut self) -> Option<T> {
        self.q.pop_front()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }
    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.q.len() >= self.cap
    }
    pub fn capacity(&self) -> usize {
        self.cap
    }
}

pub struct TaskExecutor {
    id: ExecutorId,
    queue: BoundedQueue<Task>,
    executed: u64,
}

impl TaskExecutor {
    pub fn new(id: ExecutorId, max_tasks: usize) -> Self {
        Self {
            id,
            queue: BoundedQueue::with_capacity(max_tasks),
            executed: 0,
        }
    }

    pub fn id(&self) -> ExecutorId {
        self.id
    }

    /// Tasks queued and not yet run.
    pub fn num_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn has_capacity(&self) -> bool {
        !self.queue.is_full()
    }

    /// Tasks run to completion so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Queue a task; a full executor hands it back.
    pub fn push_task(&mut self, task: Task) -> Result<(), Task> {
        self.queue.try_push(task)
    }

    /// Run every queued task in FIFO order.
    ///
    /// Stops at the first failing task and returns its error; tasks behind it
    /// stay queued. No retries here.
    pub fn run_pending(&mut self) -> Result<usize, ExecError> {
        let mut ran = 0;
        while let Some(task) = self.queue.try_pop() {
            #[cfg(feature = "tracing")]
            tracing::trace!(executor = %self.id, task = %task.id, op = %task.op_key, "run task");
            task.run()?;
            self.executed += 1;
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_queue_rejects_when_full() {
        let mut q = BoundedQueue::with_capacity(2);
        assert!(q.try_push(1).is_ok());
        assert!(q.try_push(2).is_ok());
        assert!(q.is_full());
        assert_eq!(q.try_push(3), Err(3));
        assert_eq!(q.try_pop(), Some(1));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn zero_capacity_rounds_up() {
        let q: BoundedQueue<u8> = BoundedQueue::with_capacity(0);
        assert_eq!(q.capacity(), 1);
    }
}
