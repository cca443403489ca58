//! A single operator invocation: one input bundle bound to one operator.

use std::fmt;
use std::sync::Arc;

use opfeed_core::id::{OpId, TaskId};
use opfeed_core::prelude::Row;
use opfeed_core::repr::{Describe, Repr};
use opfeed_reader::InputBundle;
use opfeed_store::ColumnStore;

use crate::operator::Operator;
use crate::runtime::ExecError;

pub struct Task {
    pub id: TaskId,
    pub op_id: OpId,
    /// Registry function path (or instance name) of the operator.
    pub op_key: String,
    pub inputs: InputBundle,
    operator: Arc<dyn Operator>,
    sink: Option<ColumnStore>,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        op_id: OpId,
        op_key: String,
        inputs: InputBundle,
        operator: Arc<dyn Operator>,
        sink: Option<ColumnStore>,
    ) -> Self {
        Self {
            id,
            op_id,
            op_key,
            inputs,
            operator,
            sink,
        }
    }

    /// Invoke the operator and append its row to the sink, if any.
    pub fn run(self) -> Result<Row, ExecError> {
        let row = self
            .operator
            .call(&self.inputs)
            .map_err(|source| ExecError::Operator {
                op: self.op_key.clone(),
                source,
            })?;
        if let Some(sink) = &self.sink {
            if row.is_empty() {
                sink.append_empty()?;
            } else {
                sink.append(row.clone())?;
            }
        }
        Ok(row)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("op_id", &self.op_id)
            .field("op_key", &self.op_key)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl Describe for Task {
    fn describe(&self) -> Repr {
        Repr::new("Task")
            .field("id", self.id)
            .field("op", self.op_id)
            .field("op_key", &self.op_key)
            .field_with("inputs", &self.inputs, |b| {
                b.iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
    }
}
