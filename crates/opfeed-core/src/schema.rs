//! Column-store schema types. Pure data.
//!
//! A `Schema` fixes the width of every non-degenerate row appended to a store;
//! readers validate their column index maps against it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::repr::{Describe, Repr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Null,
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
    Binary,
    /// Dense f32 tensor of any shape.
    Tensor,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Null => "null",
            DataType::Boolean => "boolean",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
            DataType::Binary => "binary",
            DataType::Tensor => "tensor",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

impl Describe for Field {
    fn describe(&self) -> Repr {
        Repr::new("Field")
            .field("name", &self.name)
            .field("dtype", self.data_type)
            .field("nullable", self.nullable)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of columns in a full row.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl Describe for Schema {
    fn describe(&self) -> Repr {
        Repr::new("Schema")
            .field("width", self.width())
            .field_with("columns", &self.fields, |fields| {
                fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.data_type))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Schema {
        Schema::new(vec![
            Field::new("a", DataType::Int64, false),
            Field::new("b", DataType::Utf8, true),
            Field::new("c", DataType::Float64, false),
        ])
    }

    #[test]
    fn index_lookup() {
        let s = abc();
        assert_eq!(s.width(), 3);
        assert_eq!(s.index_of("c"), Some(2));
        assert_eq!(s.index_of("z"), None);
    }

    #[test]
    fn schema_repr_lists_columns() {
        assert_eq!(
            abc().serialize_repr(),
            "Schema:\n  width: 3\n  columns: a:int64, b:utf8, c:float64\n"
        );
    }
}
