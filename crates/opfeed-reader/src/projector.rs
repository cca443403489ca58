//! Input projector: pick the declared columns out of a raw row.
//!
//! The `ColumnIndexMap` is built once from an operator's declared inputs and
//! never changes. Projection is a pure function of the map and one row.

use std::collections::HashSet;

use opfeed_core::prelude::{Row, Schema};
use opfeed_core::repr::{Describe, Repr};

use crate::bundle::InputBundle;
use crate::error::{ReaderError, Result};

/// `{input name -> column index}`, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndexMap {
    entries: Vec<(String, usize)>,
}

impl ColumnIndexMap {
    /// Build from `(input name, column index)` pairs. Names must be unique.
    pub fn new<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (name, index) in pairs {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(ReaderError::DuplicateInput(name));
            }
            entries.push((name, index));
        }
        Ok(Self { entries })
    }

    /// An operator with no declared inputs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(input name, column name)` pairs resolved against `schema`.
    pub fn resolve<I, S, C>(schema: &Schema, wanted: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: AsRef<str>,
    {
        let pairs = wanted
            .into_iter()
            .map(|(input, column)| {
                let input: String = input.into();
                let column = column.as_ref();
                match schema.index_of(column) {
                    Some(idx) => Ok((input, idx)),
                    None => Err(ReaderError::UnknownColumn {
                        input,
                        column: column.to_string(),
                    }),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(pairs)
    }

    /// Fail if any index falls outside rows of `width` columns.
    pub fn check_width(&self, width: usize) -> Result<()> {
        match self.entries.iter().find(|(_, idx)| *idx >= width) {
            Some((input, index)) => Err(ReaderError::IndexOutOfRange {
                input: input.clone(),
                index: *index,
                width,
            }),
            None => Ok(()),
        }
    }

    /// Smallest row width every index fits in.
    pub fn required_width(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, idx)| idx + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn get(&self, input: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == input)
            .map(|(_, idx)| *idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(n, i)| (n.as_str(), *i))
    }

    /// Project `row` onto the declared inputs.
    ///
    /// # Panics
    ///
    /// If an index is outside `row`. The map and the row shape come from the
    /// same schema, so this is a wiring bug, not a data condition.
    pub fn project(&self, row: &Row) -> InputBundle {
        let mut bundle = InputBundle::new();
        for (input, index) in &self.entries {
            match row.get(*index) {
                Some(value) => {
                    bundle.insert(input.as_str(), value.clone());
                }
                None => panic!(
                    "input '{input}' maps to column {index} but the row has {} columns",
                    row.len()
                ),
            }
        }
        bundle
    }
}

/// Free-function form of [`ColumnIndexMap::project`].
pub fn project(row: &Row, index_map: &ColumnIndexMap) -> InputBundle {
    index_map.project(row)
}

impl Describe for ColumnIndexMap {
    fn describe(&self) -> Repr {
        self.entries
            .iter()
            .fold(Repr::new("ColumnIndexMap"), |r, (input, idx)| {
                r.field(input, idx)
            })
    }
}
