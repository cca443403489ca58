//! Explicit, declaration-ordered textual representations.
//!
//! Every type that wants a dump lists its fields by hand:
//!
//! ```
//! use opfeed_core::repr::Repr;
//!
//! let repr = Repr::new("Variable")
//!     .field("name", "score")
//!     .field_with("dims", &[2usize, 3], |d| format!("{}x{}", d[0], d[1]));
//! assert_eq!(repr.to_string(), "Variable:\n  name: score\n  dims: 2x3\n");
//! ```
//!
//! Adding a field to a struct never changes its repr until the field is also
//! declared here.

use std::fmt;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Text(String),
    Nested(Repr),
}

/// Builder for a `TypeName:` header followed by `name: value` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Repr {
    type_name: String,
    fields: Vec<(String, Entry)>,
}

impl Repr {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field rendered with its `Display` impl.
    pub fn field(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.fields
            .push((name.to_string(), Entry::Text(value.to_string())));
        self
    }

    /// Declare a field rendered by an explicit formatter.
    pub fn field_with<T: ?Sized>(
        mut self,
        name: &str,
        value: &T,
        formatter: impl FnOnce(&T) -> String,
    ) -> Self {
        self.fields
            .push((name.to_string(), Entry::Text(formatter(value))));
        self
    }

    /// Declare an optional field; `None` renders as `none`.
    pub fn opt_field<T: fmt::Display>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self.field(name, "none"),
        }
    }

    /// Declare a field that is itself a repr; rendered one level deeper.
    pub fn nested(mut self, name: &str, repr: Repr) -> Self {
        self.fields.push((name.to_string(), Entry::Nested(repr)));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Names of the declared fields, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// JSON view: `{"type": ..., <field>: ...}`. Nested reprs become objects.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.type_name.clone()));
        for (name, entry) in &self.fields {
            let v = match entry {
                Entry::Text(s) => Value::String(s.clone()),
                Entry::Nested(r) => r.to_json(),
            };
            obj.insert(name.clone(), v);
        }
        Value::Object(obj)
    }

    fn render(&self, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.type_name)?;
        let pad = "  ".repeat(depth + 1);
        for (name, entry) in &self.fields {
            match entry {
                Entry::Text(s) => writeln!(f, "{pad}{name}: {s}")?,
                Entry::Nested(r) => {
                    write!(f, "{pad}{name}: ")?;
                    r.render(depth + 1, f)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(0, f)
    }
}

/// Types with an explicitly declared representation.
pub trait Describe {
    fn describe(&self) -> Repr;

    /// Text form of [`Describe::describe`].
    fn serialize_repr(&self) -> String {
        self.describe().to_string()
    }
}
