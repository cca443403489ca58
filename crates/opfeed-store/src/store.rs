//! Thread-safe append-only column store.
//!
//! Values are kept column by column. A separate slot log records append order
//! so that degenerate "empty append" markers keep their place in the stream.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use opfeed_core::prelude::{Column, Row, Scalar, Schema};

use crate::cursor::MapCursor;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Position of the row inside every column.
    Row(usize),
    Empty,
}

struct StoreInner {
    columns: Vec<Column>,
    slots: Vec<Slot>,
    sealed: bool,
}

/// Shared handle to an append-only store; clones see the same data.
#[derive(Clone)]
pub struct ColumnStore {
    schema: Arc<Schema>,
    inner: Arc<RwLock<StoreInner>>,
}

impl ColumnStore {
    pub fn new(schema: Schema) -> Self {
        let columns = schema.fields.iter().map(|f| Column::new(&f.name)).collect();
        Self {
            schema: Arc::new(schema),
            inner: Arc::new(RwLock::new(StoreInner {
                columns,
                slots: Vec::new(),
                sealed: false,
            })),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Both handles refer to the same underlying store.
    pub fn same_store(&self, other: &ColumnStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    /// Append one full row; returns its slot in the stream.
    pub fn append(&self, row: impl Into<Row>) -> Result<usize> {
        let row = row.into();
        let expected = self.schema.width();
        if row.len() != expected {
            return Err(StoreError::Arity {
                expected,
                got: row.len(),
            });
        }
        let mut inner = self.write()?;
        if inner.sealed {
            return Err(StoreError::Sealed);
        }
        let position = inner.columns.first().map(Column::len).unwrap_or(0);
        for (col, value) in inner.columns.iter_mut().zip(row.into_values()) {
            col.values.push(value);
        }
        inner.slots.push(Slot::Row(position));
        Ok(inner.slots.len() - 1)
    }

    /// Append a degenerate empty marker; cursors yield it as a zero-width row.
    pub fn append_empty(&self) -> Result<usize> {
        let mut inner = self.write()?;
        if inner.sealed {
            return Err(StoreError::Sealed);
        }
        inner.slots.push(Slot::Empty);
        Ok(inner.slots.len() - 1)
    }

    /// Declare that nothing more will be appended. Idempotent.
    pub fn seal(&self) -> Result<()> {
        self.write()?.sealed = true;
        Ok(())
    }

    pub fn is_sealed(&self) -> Result<bool> {
        Ok(self.read()?.sealed)
    }

    /// Number of appended units, empty markers included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.slots.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of one column's values (empty markers contribute nothing).
    pub fn column(&self, name: &str) -> Result<Option<Vec<Scalar>>> {
        let idx = match self.schema.index_of(name) {
            Some(idx) => idx,
            None => return Ok(None),
        };
        let inner = self.read()?;
        Ok(inner.columns.get(idx).map(|c| c.values.clone()))
    }

    /// All units in append order. Mostly useful for inspecting operator outputs.
    pub fn rows(&self) -> Result<Vec<Row>> {
        let inner = self.read()?;
        (0..inner.slots.len())
            .map(|slot| gather(&inner, slot))
            .collect()
    }

    /// A fresh cursor positioned before the first unit.
    pub fn map_cursor(&self) -> MapCursor {
        MapCursor::new(self.clone())
    }

    /// Materialize the unit at `slot`, if it has been appended.
    pub(crate) fn unit_at(&self, slot: usize) -> Result<UnitAt> {
        let inner = self.read()?;
        if slot < inner.slots.len() {
            Ok(UnitAt::Ready(gather(&inner, slot)?))
        } else if inner.sealed {
            Ok(UnitAt::End)
        } else {
            Ok(UnitAt::NotYet)
        }
    }

    /// Units appended at or after `slot`.
    pub(crate) fn available_from(&self, slot: usize) -> Result<usize> {
        Ok(self.read()?.slots.len().saturating_sub(slot))
    }
}

pub(crate) enum UnitAt {
    Ready(Row),
    NotYet,
    End,
}

fn gather(inner: &StoreInner, slot: usize) -> Result<Row> {
    match inner.slots.get(slot) {
        Some(Slot::Empty) => Ok(Row::empty()),
        Some(Slot::Row(pos)) => inner
            .columns
            .iter()
            .map(|col| {
                col.values.get(*pos).cloned().ok_or_else(|| {
                    StoreError::Corrupt(format!(
                        "column '{}' has no value at position {pos}",
                        col.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Row::new),
        None => Err(StoreError::Corrupt(format!("slot {slot} out of range"))),
    }
}
