//! Run-scoped context variables.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value mapping threaded through tool invocations for one run.
///
/// Lookups are explicit: [`get`](Self::get) returns `None` for a missing key,
/// and [`text_or_empty`](Self::text_or_empty) is the one place where a missing
/// key silently reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextVariables(Map<String, Value>);

impl ContextVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Textual value for `key` for prompt templating.
    ///
    /// Missing keys and `null` read as `""`; strings are returned verbatim and
    /// every other value as its JSON text.
    pub fn text_or_empty(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Fold `delta` into this mapping; keys in `delta` overwrite existing ones.
    pub fn merge(&mut self, delta: &ContextVariables) {
        for (key, value) in &delta.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow as a JSON object map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Snapshot as a JSON object value, as injected into tool arguments.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for ContextVariables {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContextVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
