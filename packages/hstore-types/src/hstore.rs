//! The hstore map backing virtual fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// String-keyed mutable map persisted as a single column.
///
/// Keys are kept ordered so serialized output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HStore {
    entries: BTreeMap<String, Value>,
}

impl HStore {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the value stored under `key`, or `default` when the key is absent.
    ///
    /// A present key is returned verbatim, including `Null` and empty strings.
    pub fn get_or(&self, key: &str, default: &Value) -> Value {
        self.entries.get(key).unwrap_or(default).clone()
    }

    /// Inserts `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for HStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
