//! Operator context: one operator, its single reader, and its output store.

use std::collections::VecDeque;
use std::sync::Arc;

use opfeed_core::id::{OpId, TaskId};
use opfeed_core::repr::{Describe, Repr};
use opfeed_reader::{InputBundle, Reader, ReaderState};
use opfeed_store::ColumnStore;

use crate::operator::Operator;
use crate::runtime::ExecError;
use crate::task::Task;

pub struct OperatorContext {
    id: OpId,
    key: String,
    reader: Box<dyn Reader>,
    operator: Arc<dyn Operator>,
    output: Option<ColumnStore>,
    /// Bundles read ahead (batch/window reads) but not yet turned into tasks.
    ready: VecDeque<InputBundle>,
    next_task: TaskId,
}

impl OperatorContext {
    pub fn new(
        id: OpId,
        key: impl Into<String>,
        reader: Box<dyn Reader>,
        operator: Arc<dyn Operator>,
        output: Option<ColumnStore>,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            reader,
            operator,
            output,
            ready: VecDeque::new(),
            next_task: TaskId::new(0),
        }
    }

    pub fn id(&self) -> OpId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reader(&self) -> &dyn Reader {
        self.reader.as_ref()
    }

    pub fn output(&self) -> Option<&ColumnStore> {
        self.output.as_ref()
    }

    /// Read up to `n` bundles and wrap each in a task. Fewer (or none) come
    /// back when the reader has nothing right now.
    pub fn pop_ready_tasks(&mut self, n: usize) -> Result<Vec<Task>, ExecError> {
        while self.ready.len() < n {
            let out = self.reader.read()?;
            if out.bundle_count() == 0 {
                break;
            }
            self.ready.extend(out.into_bundles());
        }
        let take = n.min(self.ready.len());
        let mut tasks = Vec::with_capacity(take);
        for inputs in self.ready.drain(..take) {
            let id = self.next_task;
            self.next_task = id.next();
            tasks.push(Task::new(
                id,
                self.id,
                self.key.clone(),
                inputs,
                Arc::clone(&self.operator),
                self.output.clone(),
            ));
        }
        Ok(tasks)
    }

    /// Put a task that could not be placed back at the front of the queue.
    pub(crate) fn requeue(&mut self, task: Task) {
        self.ready.push_front(task.inputs);
    }

    /// Bundles read ahead plus rows the reader could hand out now (advisory).
    pub fn pending_inputs(&self) -> usize {
        self.ready.len() + self.reader.size()
    }

    /// No more tasks will ever come out of this context.
    pub fn is_finished(&self) -> bool {
        self.reader.is_exhausted() && self.ready.is_empty()
    }

    /// Seal the output store so downstream readers can reach end of stream.
    pub(crate) fn seal_output(&self) -> Result<(), ExecError> {
        if let Some(out) = &self.output {
            out.seal()?;
        }
        Ok(())
    }
}

impl Describe for OperatorContext {
    fn describe(&self) -> Repr {
        Repr::new("OperatorContext")
            .field("id", self.id)
            .field("key", &self.key)
            .field("operator", self.operator.name())
            .field("reader", self.reader.name())
            .field_with("state", &self.reader.state(), |s| match s {
                ReaderState::Active => "active".to_string(),
                ReaderState::Exhausted => "exhausted".to_string(),
            })
            .nested("inputs", self.reader.index_map().describe())
            .opt_field("output_width", self.output.as_ref().map(|o| o.schema().width()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Select;
    use opfeed_core::prelude::{DataType, Field, Scalar, Schema};
    use opfeed_reader::{build_reader, ColumnIndexMap, ReaderKind};

    fn context(kind: ReaderKind, rows: i64) -> (OperatorContext, ColumnStore) {
        let input = ColumnStore::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        for i in 0..rows {
            input.append(vec![Scalar::I64(i)]).unwrap();
        }
        input.seal().unwrap();
        let out = ColumnStore::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        let reader = build_reader(kind, &input, ColumnIndexMap::new([("v", 0)]).unwrap()).unwrap();
        let op = Arc::new(Select {
            outputs: vec!["v".into()],
        });
        (
            OperatorContext::new(OpId::new(1), "builtin/select", reader, op, Some(out.clone())),
            out,
        )
    }

    #[test]
    fn tasks_carry_sequential_ids() {
        let (mut ctx, _) = context(ReaderKind::Map, 3);
        let tasks = ctx.pop_ready_tasks(2).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, TaskId::new(0));
        assert_eq!(tasks[1].id, TaskId::new(1));
        assert_eq!(tasks[1].inputs["v"], Scalar::I64(1));
        assert_eq!(ctx.pop_ready_tasks(5).unwrap().len(), 1);
        assert!(ctx.pop_ready_tasks(1).unwrap().is_empty());
        assert!(ctx.is_finished());
    }

    #[test]
    fn batch_reads_are_buffered_between_pops() {
        let (mut ctx, _) = context(ReaderKind::Batch { size: 4 }, 4);
        assert_eq!(ctx.pop_ready_tasks(1).unwrap().len(), 1);
        assert_eq!(ctx.pending_inputs(), 3);
        assert!(!ctx.is_finished());
        assert_eq!(ctx.pop_ready_tasks(10).unwrap().len(), 3);
    }

    #[test]
    fn running_tasks_fills_output() {
        let (mut ctx, out) = context(ReaderKind::Map, 2);
        for task in ctx.pop_ready_tasks(2).unwrap() {
            task.run().unwrap();
        }
        assert_eq!(
            out.column("v").unwrap().unwrap(),
            vec![Scalar::I64(0), Scalar::I64(1)]
        );
    }

    #[test]
    fn describe_mentions_reader_and_inputs() {
        let (ctx, _) = context(ReaderKind::Window { size: 2, step: 1 }, 0);
        let text = ctx.serialize_repr();
        assert!(text.starts_with("OperatorContext:\n  id: OpId(1)\n"));
        assert!(text.contains("  reader: window\n"));
        assert!(text.contains("  inputs: ColumnIndexMap:\n    v: 0\n"));
        assert!(text.contains("  output_width: 1\n"));
    }
}
