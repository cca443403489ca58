//! Row cursors: the pull primitive readers are built on.

use opfeed_core::prelude::Row;

use crate::error::Result;
use crate::store::{ColumnStore, UnitAt};

/// Outcome of one pull.
#[derive(Debug, Clone, PartialEq)]
pub enum Pull {
    /// The next unit. A zero-width row is the store's empty-append marker.
    Row(Row),
    /// Nothing to hand out right now, but the store is still open.
    Pending,
    /// The store is sealed and every unit has been handed out.
    End,
}

/// Sequential, non-rewinding pull iterator over a column store.
///
/// Implementations must be safe to pull from while a producer appends to the
/// same store (single producer, single consumer).
pub trait RowCursor: Send {
    /// Pull the next unit without blocking.
    fn next_unit(&mut self) -> Result<Pull>;

    /// Units retrievable right now without blocking.
    ///
    /// Advisory: it may be stale as soon as it returns.
    fn accessible_size(&self) -> usize;
}

impl<C: RowCursor + ?Sized> RowCursor for Box<C> {
    fn next_unit(&mut self) -> Result<Pull> {
        (**self).next_unit()
    }

    fn accessible_size(&self) -> usize {
        (**self).accessible_size()
    }
}

/// Cursor that hands out one unit per pull, in append order.
pub struct MapCursor {
    store: ColumnStore,
    position: usize,
}

impl MapCursor {
    pub fn new(store: ColumnStore) -> Self {
        Self { store, position: 0 }
    }

    /// Units handed out so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl RowCursor for MapCursor {
    fn next_unit(&mut self) -> Result<Pull> {
        match self.store.unit_at(self.position)? {
            UnitAt::Ready(row) => {
                self.position += 1;
                Ok(Pull::Row(row))
            }
            UnitAt::NotYet => Ok(Pull::Pending),
            UnitAt::End => Ok(Pull::End),
        }
    }

    fn accessible_size(&self) -> usize {
        // A poisoned store has nothing retrievable.
        self.store.available_from(self.position).unwrap_or(0)
    }
}
