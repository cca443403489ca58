//! Sliding-window reader.
//!
//! Emits `size` consecutive bundles per window, then slides by `step`. When
//! `step > size` the rows in between are skipped. Rows left over at end of
//! stream that never made it into a window are flushed once as a short window.

use std::collections::VecDeque;

use opfeed_core::Error as CoreError;
use opfeed_store::{ColumnStore, MapCursor, RowCursor};

use crate::bundle::InputBundle;
use crate::error::Result;
use crate::projector::ColumnIndexMap;
use crate::traits::{ReadOutput, Reader, ReaderCore, ReaderState, Unit};

pub struct WindowReader<C = MapCursor> {
    core: ReaderCore<C>,
    size: usize,
    step: usize,
    buffer: VecDeque<InputBundle>,
    /// Buffered bundles not yet part of any emitted window.
    fresh: usize,
    /// Rows still to drop after a slide wider than the window.
    skip: usize,
}

impl WindowReader<MapCursor> {
    pub fn new(
        store: &ColumnStore,
        index_map: ColumnIndexMap,
        size: usize,
        step: usize,
    ) -> Result<Self> {
        index_map.check_width(store.schema().width())?;
        Self::with_cursor(store.map_cursor(), index_map, size, step)
    }
}

impl<C: RowCursor> WindowReader<C> {
    pub fn with_cursor(
        cursor: C,
        index_map: ColumnIndexMap,
        size: usize,
        step: usize,
    ) -> Result<Self> {
        if size == 0 || step == 0 {
            return Err(CoreError::Config(format!(
                "window size and step must be at least 1 (size={size}, step={step})"
            ))
            .into());
        }
        Ok(Self {
            core: ReaderCore::new(cursor, index_map, "window"),
            size,
            step,
            buffer: VecDeque::with_capacity(size),
            fresh: 0,
            skip: 0,
        })
    }

    fn emit_full(&mut self) -> ReadOutput {
        let window: Vec<InputBundle> = self.buffer.iter().take(self.size).cloned().collect();
        self.fresh = 0;
        let drop_now = self.step.min(self.buffer.len());
        for _ in 0..drop_now {
            self.buffer.pop_front();
        }
        self.skip = self.step - drop_now;
        ReadOutput::Batch(window)
    }
}

impl<C: RowCursor> Reader for WindowReader<C> {
    fn name(&self) -> &'static str {
        "window"
    }

    fn read(&mut self) -> Result<ReadOutput> {
        loop {
            if self.buffer.len() >= self.size {
                return Ok(self.emit_full());
            }
            match self.core.pull()? {
                Unit::Bundle(_) if self.skip > 0 => self.skip -= 1,
                Unit::Bundle(b) => {
                    self.buffer.push_back(b);
                    self.fresh += 1;
                }
                Unit::Pending => return Ok(ReadOutput::EndOfStream),
                Unit::End => {
                    if self.fresh > 0 {
                        self.fresh = 0;
                        return Ok(ReadOutput::Batch(self.buffer.drain(..).collect()));
                    }
                    self.buffer.clear();
                    return Ok(ReadOutput::EndOfStream);
                }
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use opfeed_core::prelude::{DataType, Field, Scalar, Schema};

    fn sealed_store(n: i64) -> ColumnStore {
        let s = ColumnStore::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        for i in 1..=n {
            s.append(vec![Scalar::I64(i)]).unwrap();
        }
        s.seal().unwrap();
        s
    }

    fn drain(r: &mut WindowReader) -> Vec<Vec<i64>> {
        let mut windows = Vec::new();
        loop {
            match r.read().unwrap() {
                ReadOutput::EndOfStream => break,
                out => windows.push(
                    out.into_bundles()
                        .iter()
                        .map(|b| b["v"].as_i64().unwrap())
                        .collect(),
                ),
            }
        }
        windows
    }

    fn reader(n: i64, size: usize, step: usize) -> WindowReader {
        let map = ColumnIndexMap::new([("v", 0)]).unwrap();
        WindowReader::new(&sealed_store(n), map, size, step).unwrap()
    }

    #[test]
    fn sliding_by_one() {
        let mut r = reader(4, 3, 1);
        assert_eq!(drain(&mut r), vec![vec![1, 2, 3], vec![2, 3, 4]]);
        assert!(r.is_exhausted());
    }

    #[test]
    fn tumbling_flushes_short_tail() {
        let mut r = reader(5, 2, 2);
        assert_eq!(drain(&mut r), vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn step_wider_than_window_skips_rows() {
        let mut r = reader(7, 2, 3);
        assert_eq!(drain(&mut r), vec![vec![1, 2], vec![4, 5], vec![7]]);
    }

    #[test]
    fn short_stream_yields_one_partial_window() {
        let mut r = reader(2, 3, 1);
        assert_eq!(drain(&mut r), vec![vec![1, 2]]);
        assert_eq!(r.read().unwrap(), ReadOutput::EndOfStream);
    }

    #[test]
    fn zero_size_or_step_rejected() {
        let map = ColumnIndexMap::empty();
        assert!(WindowReader::new(&sealed_store(0), map.clone(), 0, 1).is_err());
        assert!(WindowReader::new(&sealed_store(0), map, 1, 0).is_err());
    }
}
