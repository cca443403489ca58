//! Operator registry: resolve `"<org>/<name>"` function paths to operators.
//!
//! Factories receive the operator's JSON arguments and return a shared
//! instance; every context bound to that function gets its own instance.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::operator::{Add, Operator, Select};
use crate::runtime::ExecError;

pub trait OperatorFactory: Send + Sync {
    fn create(&self, args: &Value) -> Result<Arc<dyn Operator>, ExecError>;
}

#[derive(Default)]
pub struct OperatorRegistry {
    factories: HashMap<String, Box<dyn OperatorFactory>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `builtin/select` and `builtin/add`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register_fn("builtin/select", |args| {
            let op: Select = parse_args("builtin/select", args)?;
            Ok(Arc::new(op) as Arc<dyn Operator>)
        });
        reg.register_fn("builtin/add", |args| {
            let op: Add = parse_args("builtin/add", args)?;
            Ok(Arc::new(op) as Arc<dyn Operator>)
        });
        reg
    }

    pub fn register<F>(&mut self, function: &str, factory: F)
    where
        F: OperatorFactory + 'static,
    {
        self.factories
            .insert(normalize(function).to_string(), Box::new(factory));
    }

    pub fn register_fn<F>(&mut self, function: &str, factory_fn: F)
    where
        F: Fn(&Value) -> Result<Arc<dyn Operator>, ExecError> + Send + Sync + 'static,
    {
        struct FnFactory<F> {
            f: F,
        }

        impl<F> OperatorFactory for FnFactory<F>
        where
            F: Fn(&Value) -> Result<Arc<dyn Operator>, ExecError> + Send + Sync,
        {
            fn create(&self, args: &Value) -> Result<Arc<dyn Operator>, ExecError> {
                (self.f)(args)
            }
        }

        self.register(function, FnFactory { f: factory_fn });
    }

    /// Instantiate the operator registered under `function`.
    pub fn load(&self, function: &str, args: &Value) -> Result<Arc<dyn Operator>, ExecError> {
        let factory = self
            .factories
            .get(normalize(function))
            .ok_or_else(|| ExecError::OperatorNotFound(function.to_string()))?;
        factory.create(args)
    }

    pub fn contains(&self, function: &str) -> bool {
        self.factories.contains_key(normalize(function))
    }

    /// Registered function paths, sorted.
    pub fn functions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn normalize(function: &str) -> &str {
    function.trim().trim_matches('/')
}

/// `null` arguments mean "no arguments": every field takes its default.
fn parse_args<T: serde::de::DeserializeOwned>(function: &str, args: &Value) -> Result<T, ExecError> {
    let args = match args {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(args)
        .map_err(|e| ExecError::Invalid(format!("bad arguments for '{function}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opfeed_core::prelude::{Row, Scalar};
    use opfeed_reader::InputBundle;
    use serde_json::json;

    #[test]
    fn builtins_load_with_args() {
        let reg = OperatorRegistry::with_builtins();
        assert_eq!(reg.functions(), vec!["builtin/add", "builtin/select"]);
        let op = reg
            .load("builtin/select", &json!({"outputs": ["x"]}))
            .unwrap();
        assert_eq!(op.name(), "select");
        let add = reg.load("/builtin/add/", &json!({})).unwrap();
        let b: InputBundle = [("a", Scalar::I64(1)), ("b", Scalar::I64(2))]
            .into_iter()
            .collect();
        assert_eq!(add.call(&b).unwrap(), Row::new(vec![Scalar::I64(3)]));
    }

    #[test]
    fn unknown_function_is_not_found() {
        let reg = OperatorRegistry::new();
        let err = reg.load("acme/resnet", &Value::Null).err().expect("missing");
        assert_eq!(err.to_string(), "operator definition not found: acme/resnet");
    }

    #[test]
    fn bad_args_are_reported() {
        let reg = OperatorRegistry::with_builtins();
        let err = reg
            .load("builtin/select", &json!({"outputs": 3}))
            .err()
            .expect("bad args");
        assert!(err.to_string().contains("bad arguments for 'builtin/select'"));
    }

    #[test]
    fn null_args_take_defaults() {
        let reg = OperatorRegistry::with_builtins();
        let add = reg.load("builtin/add", &Value::Null).unwrap();
        let b: InputBundle = [("a", Scalar::I64(4)), ("b", Scalar::I64(5))]
            .into_iter()
            .collect();
        assert_eq!(add.call(&b).unwrap(), Row::new(vec![Scalar::I64(9)]));
        // Select has no default for `outputs`.
        assert!(reg.load("builtin/select", &Value::Null).is_err());
    }

    #[test]
    fn custom_registration() {
        let mut reg = OperatorRegistry::new();
        reg.register_fn("acme/const", |_| {
            Ok(Arc::new(crate::operator::FnOperator::new("const", |_: &InputBundle| {
                Ok(Row::new(vec![Scalar::I64(42)]))
            })) as Arc<dyn Operator>)
        });
        assert!(reg.contains("acme/const"));
        let op = reg.load("acme/const", &Value::Null).unwrap();
        assert_eq!(op.call(&InputBundle::new()).unwrap().len(), 1);
    }
}
