//! Operator trait + the built-in operators the registry ships with.

use opfeed_core::prelude::{Row, Scalar};
use opfeed_reader::InputBundle;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("missing input '{0}'")]
    MissingInput(String),

    #[error("input '{name}': {reason}")]
    BadInput { name: String, reason: String },

    #[error("execution error: {0}")]
    Exec(String),
}

/// A unit of computation invoked once per input bundle.
///
/// `call` must not keep references to the bundle; the bundle is dropped once
/// the invocation returns.
pub trait Operator: Send + Sync + 'static {
    /// Human-readable operator name (stable).
    fn name(&self) -> &str;

    /// Produce one output row from one bundle. An empty row is appended to
    /// the output store as an empty marker.
    fn call(&self, inputs: &InputBundle) -> Result<Row, OpError>;
}

/// Operator backed by a closure.
pub struct FnOperator<F> {
    name: String,
    f: F,
}

impl<F> FnOperator<F>
where
    F: Fn(&InputBundle) -> Result<Row, OpError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Operator for FnOperator<F>
where
    F: Fn(&InputBundle) -> Result<Row, OpError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, inputs: &InputBundle) -> Result<Row, OpError> {
        (self.f)(inputs)
    }
}

/// Emits the named inputs as a row, in `outputs` order.
#[derive(Debug, Clone, Deserialize)]
pub struct Select {
    pub outputs: Vec<String>,
}

impl Operator for Select {
    fn name(&self) -> &str {
        "select"
    }

    fn call(&self, inputs: &InputBundle) -> Result<Row, OpError> {
        self.outputs
            .iter()
            .map(|name| {
                inputs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| OpError::MissingInput(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Row::new)
    }
}

/// Adds two numeric inputs. Integer + integer stays `I64`; anything else is `F64`.
#[derive(Debug, Clone, Deserialize)]
pub struct Add {
    #[serde(default = "default_left")]
    pub left: String,
    #[serde(default = "default_right")]
    pub right: String,
}

fn default_left() -> String {
    "a".into()
}

fn default_right() -> String {
    "b".into()
}

impl Add {
    fn operand<'a>(&self, inputs: &'a InputBundle, name: &str) -> Result<&'a Scalar, OpError> {
        inputs
            .get(name)
            .ok_or_else(|| OpError::MissingInput(name.to_string()))
    }
}

impl Operator for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn call(&self, inputs: &InputBundle) -> Result<Row, OpError> {
        let l = self.operand(inputs, &self.left)?;
        let r = self.operand(inputs, &self.right)?;
        let sum = match (l.as_i64(), r.as_i64()) {
            (Some(a), Some(b)) => Scalar::I64(a.checked_add(b).ok_or_else(|| {
                OpError::Exec(format!("integer overflow adding {a} and {b}"))
            })?),
            _ => {
                let num = |name: &str, v: &Scalar| {
                    v.as_f64().ok_or_else(|| OpError::BadInput {
                        name: name.to_string(),
                        reason: format!("expected a number, got {}", v.data_type()),
                    })
                };
                Scalar::F64(num(&self.left, l)? + num(&self.right, r)?)
            }
        };
        Ok(Row::new(vec![sum]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(pairs: &[(&str, Scalar)]) -> InputBundle {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn select_orders_outputs() {
        let op = Select {
            outputs: vec!["z".into(), "x".into()],
        };
        let row = op
            .call(&bundle(&[("x", Scalar::I64(1)), ("z", Scalar::F64(3.5))]))
            .unwrap();
        assert_eq!(row.values(), &[Scalar::F64(3.5), Scalar::I64(1)]);
        assert!(matches!(
            op.call(&bundle(&[("x", Scalar::I64(1))])),
            Err(OpError::MissingInput(n)) if n == "z"
        ));
    }

    #[test]
    fn add_integers_and_floats() {
        let op = Add {
            left: "a".into(),
            right: "b".into(),
        };
        let ints = op
            .call(&bundle(&[("a", Scalar::I64(2)), ("b", Scalar::I32(3))]))
            .unwrap();
        assert_eq!(ints.values(), &[Scalar::I64(5)]);
        let mixed = op
            .call(&bundle(&[("a", Scalar::I64(2)), ("b", Scalar::F64(0.5))]))
            .unwrap();
        assert_eq!(mixed.values(), &[Scalar::F64(2.5)]);
        let err = op
            .call(&bundle(&[("a", Scalar::from("x")), ("b", Scalar::F64(0.5))]))
            .unwrap_err();
        assert!(err.to_string().contains("expected a number, got utf8"));
    }

    #[test]
    fn fn_operator_wraps_closure() {
        let op = FnOperator::new("count", |b: &InputBundle| {
            Ok(Row::new(vec![Scalar::I64(b.len() as i64)]))
        });
        assert_eq!(op.name(), "count");
        assert_eq!(
            op.call(&InputBundle::new()).unwrap().values(),
            &[Scalar::I64(0)]
        );
    }
}
