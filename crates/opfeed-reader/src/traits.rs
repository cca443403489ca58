//! Reader contract + the pull core every strategy shares.
//!
//! The engine calls `read()` once per scheduling tick. Strategies differ only
//! in how many cursor units make up one `read()`; pulling, projection and the
//! `Active -> Exhausted` transition live in `ReaderCore`.

use opfeed_core::prelude::Row;
use opfeed_store::{Pull, RowCursor};

use crate::bundle::InputBundle;
use crate::error::Result;
use crate::projector::ColumnIndexMap;

/// What one `read()` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutput {
    /// Exactly one bundle (row-at-a-time strategies).
    Bundle(InputBundle),
    /// Zero or more bundles (batch and window strategies).
    Batch(Vec<InputBundle>),
    /// Nothing to hand out. Check `Reader::state` to see if more can follow.
    EndOfStream,
}

impl ReadOutput {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutput::EndOfStream)
    }

    /// Number of bundles carried.
    pub fn bundle_count(&self) -> usize {
        match self {
            ReadOutput::Bundle(_) => 1,
            ReadOutput::Batch(b) => b.len(),
            ReadOutput::EndOfStream => 0,
        }
    }

    /// Flatten into bundles; end of stream yields none.
    pub fn into_bundles(self) -> Vec<InputBundle> {
        match self {
            ReadOutput::Bundle(b) => vec![b],
            ReadOutput::Batch(b) => b,
            ReadOutput::EndOfStream => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// The cursor may still hand out rows, now or after further appends.
    Active,
    /// The cursor signalled permanent end. One-way.
    Exhausted,
}

/// Pull contract shared by all reading strategies.
///
/// Implementations are not internally synchronized; exactly one caller owns
/// a reader at a time.
pub trait Reader: Send {
    /// Stable strategy name.
    fn name(&self) -> &'static str;

    /// Advance the cursor by one logical unit of this strategy.
    ///
    /// Never blocks. Once exhausted, returns `EndOfStream` forever without
    /// touching the cursor again. Cursor faults are returned unchanged.
    fn read(&mut self) -> Result<ReadOutput>;

    /// Rows the cursor can hand out right now. Advisory only: more rows may
    /// be appended before the next `read()`.
    fn size(&self) -> usize;

    fn state(&self) -> ReaderState;

    fn is_exhausted(&self) -> bool {
        self.state() == ReaderState::Exhausted
    }

    fn index_map(&self) -> &ColumnIndexMap;
}

/// One cursor unit after projection.
pub(crate) enum Unit {
    Bundle(InputBundle),
    Pending,
    End,
}

/// Cursor + index map + state; the part of every reader that is not strategy.
pub(crate) struct ReaderCore<C> {
    cursor: C,
    index_map: ColumnIndexMap,
    state: ReaderState,
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    strategy: &'static str,
}

impl<C: RowCursor> ReaderCore<C> {
    pub(crate) fn new(cursor: C, index_map: ColumnIndexMap, strategy: &'static str) -> Self {
        Self {
            cursor,
            index_map,
            state: ReaderState::Active,
            strategy,
        }
    }

    /// Pull and project one unit.
    pub(crate) fn pull(&mut self) -> Result<Unit> {
        if self.state == ReaderState::Exhausted {
            return Ok(Unit::End);
        }
        match self.cursor.next_unit()? {
            Pull::Row(row) => Ok(Unit::Bundle(self.to_bundle(&row))),
            Pull::Pending => {
                #[cfg(feature = "tracing")]
                tracing::trace!(reader = self.strategy, "cursor pending");
                Ok(Unit::Pending)
            }
            Pull::End => {
                self.state = ReaderState::Exhausted;
                #[cfg(feature = "tracing")]
                tracing::debug!(reader = self.strategy, "reader exhausted");
                Ok(Unit::End)
            }
        }
    }

    fn to_bundle(&self, row: &Row) -> InputBundle {
        // Empty append marker: an empty bundle, distinct from end of stream.
        if row.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::trace!(reader = self.strategy, "degenerate row");
            return InputBundle::new();
        }
        self.index_map.project(row)
    }

    pub(crate) fn size(&self) -> usize {
        self.cursor.accessible_size()
    }

    pub(crate) fn state(&self) -> ReaderState {
        self.state
    }

    pub(crate) fn index_map(&self) -> &ColumnIndexMap {
        &self.index_map
    }
}
