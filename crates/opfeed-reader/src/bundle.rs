//! Named inputs for one operator invocation.

use std::collections::BTreeMap;
use std::ops::Index;

use opfeed_core::prelude::Scalar;
use serde::Serialize;

/// `{input name -> value}`, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InputBundle(BTreeMap<String, Scalar>);

impl InputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Scalar) -> Option<Scalar> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> BTreeMap<String, Scalar> {
        self.0
    }
}

impl Index<&str> for InputBundle {
    type Output = Scalar;

    fn index(&self, name: &str) -> &Scalar {
        match self.0.get(name) {
            Some(v) => v,
            None => panic!("input bundle has no input named '{name}'"),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for InputBundle {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for InputBundle {
    type Item = (String, Scalar);
    type IntoIter = std::collections::btree_map::IntoIter<String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
