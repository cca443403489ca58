//! Batch reader: up to `batch_size` currently available rows per `read()`.

use opfeed_core::Error as CoreError;
use opfeed_store::{ColumnStore, MapCursor, RowCursor};

use crate::error::Result;
use crate::projector::ColumnIndexMap;
use crate::traits::{ReadOutput, Reader, ReaderCore, ReaderState, Unit};

pub struct BatchReader<C = MapCursor> {
    core: ReaderCore<C>,
    batch_size: usize,
}

impl BatchReader<MapCursor> {
    pub fn new(store: &ColumnStore, index_map: ColumnIndexMap, batch_size: usize) -> Result<Self> {
        index_map.check_width(store.schema().width())?;
        Self::with_cursor(store.map_cursor(), index_map, batch_size)
    }
}

impl<C: RowCursor> BatchReader<C> {
    pub fn with_cursor(cursor: C, index_map: ColumnIndexMap, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(CoreError::Config("batch size must be at least 1".into()).into());
        }
        Ok(Self {
            core: ReaderCore::new(cursor, index_map, "batch"),
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<C: RowCursor> Reader for BatchReader<C> {
    fn name(&self) -> &'static str {
        "batch"
    }

    /// Returns whatever is available up to `batch_size`. A batch cut short by
    /// the end of the stream is still returned; the following call reports
    /// `EndOfStream`.
    fn read(&mut self) -> Result<ReadOutput> {
        let mut bundles = Vec::new();
        while bundles.len() < self.batch_size {
            match self.core.pull()? {
                Unit::Bundle(b) => bundles.push(b),
                Unit::Pending | Unit::End => break,
            }
        }
        if bundles.is_empty() {
            Ok(ReadOutput::EndOfStream)
        } else {
            Ok(ReadOutput::Batch(bundles))
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
