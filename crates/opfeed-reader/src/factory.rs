//! Build a boxed reader from a `ReaderKind`.

pub use opfeed_core::config::ReaderKind;
use opfeed_store::ColumnStore;

use crate::batch::BatchReader;
use crate::error::Result;
use crate::map::RowReader;
use crate::projector::ColumnIndexMap;
use crate::traits::Reader;
use crate::window::WindowReader;

/// One reader per call; the caller binds it to exactly one operator context.
pub fn build_reader(
    kind: ReaderKind,
    store: &ColumnStore,
    index_map: ColumnIndexMap,
) -> Result<Box<dyn Reader>> {
    kind.validate()?;
    let reader: Box<dyn Reader> = match kind {
        ReaderKind::Map => Box::new(RowReader::new(store, index_map)?),
        ReaderKind::Batch { size } => Box::new(BatchReader::new(store, index_map, size)?),
        ReaderKind::Window { size, step } => {
            Box::new(WindowReader::new(store, index_map, size, step)?)
        }
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(reader = reader.name(), inputs = reader.index_map().len(), "reader built");
    Ok(reader)
}
