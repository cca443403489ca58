//! Row-at-a-time ("map") reader.

use opfeed_store::{ColumnStore, MapCursor, RowCursor};

use crate::error::Result;
use crate::projector::ColumnIndexMap;
use crate::traits::{ReadOutput, Reader, ReaderCore, ReaderState, Unit};

/// Hands out one input bundle per `read()`.
pub struct RowReader<C = MapCursor> {
    core: ReaderCore<C>,
}

impl RowReader<MapCursor> {
    /// Reader over `store`; the index map is checked against the store width
    /// up front.
    pub fn new(store: &ColumnStore, index_map: ColumnIndexMap) -> Result<Self> {
        index_map.check_width(store.schema().width())?;
        Ok(Self::with_cursor(store.map_cursor(), index_map))
    }
}

impl<C: RowCursor> RowReader<C> {
    /// Reader over an arbitrary cursor. No width check is possible here; a
    /// mismatched map panics on the first projected row.
    pub fn with_cursor(cursor: C, index_map: ColumnIndexMap) -> Self {
        Self {
            core: ReaderCore::new(cursor, index_map, "map"),
        }
    }
}

impl<C: RowCursor> Reader for RowReader<C> {
    fn name(&self) -> &'static str {
        "map"
    }

    fn read(&mut self) -> Result<ReadOutput> {
        match self.core.pull()? {
            Unit::Bundle(b) => Ok(ReadOutput::Bundle(b)),
            Unit::Pending | Unit::End => Ok(ReadOutput::EndOfStream),
        }
    }

    fn size(&self) -> usize {
        self.core.size()
    }

    fn state(&self) -> ReaderState {
        self.core.state()
    }

    fn index_map(&self) -> &ColumnIndexMap {
        self.core.index_map()
    }
}
