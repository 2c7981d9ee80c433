//! Document metadata.
//!
//! [`Metadata`] is an ordered mapping from string keys to JSON values. Lookup is
//! by key; order only matters when enumerating. Merging overwrites key-by-key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered key/value metadata attached to a [`Document`](crate::Document).
///
/// # Example
///
/// ```
/// use rw_shortcodes::Metadata;
///
/// let mut base = Metadata::new();
/// base.insert("Foo", 10);
/// base.insert("Title", "Home");
///
/// let mut delta = Metadata::new();
/// delta.insert("Foo", 11);
///
/// base.merge(&delta);
/// assert_eq!(base.get_i64("Foo"), Some(11));
/// assert_eq!(base.get_str("Title"), Some("Home"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value. Non-string values return `None`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get an integer value, accepting numeric strings.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a list value. Non-array values return `None`.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        self.0.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Render a value as display text.
    ///
    /// Strings are returned verbatim, `null` as an empty string, and every other
    /// value as compact JSON.
    #[must_use]
    pub fn get_display(&self, key: &str) -> Option<String> {
        self.0.get(key).map(display_value)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Overwrite this metadata key-by-key with `delta`.
    ///
    /// Keys already present keep their position; new keys are appended in the
    /// order they appear in `delta`.
    pub fn merge(&mut self, delta: &Metadata) {
        for (key, value) in &delta.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Return a copy overwritten by `delta`.
    #[must_use]
    pub fn merged(&self, delta: &Metadata) -> Self {
        let mut merged = self.clone();
        merged.merge(delta);
        merged
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow as a JSON object map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
