//! Metadata as a string-keyed mapping over a tagged value union
//!
//! Extraction output arrives as free-form JSON; representing values as a
//! small union (text, integer, string list, nested map) keeps structural
//! containment matching well-defined.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata value: text, integer, list of strings, or a nested mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Plain text value
    Text(String),
    /// Integer value (chunk indices, sizes)
    Integer(i64),
    /// List of strings (skills, topics, ...)
    List(Vec<String>),
    /// Nested mapping (social_profiles, ...)
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Lossy conversion from JSON. Strings, integers, arrays of strings
    /// and objects are kept; nulls, floats, booleans and mixed arrays
    /// are dropped.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Integer),
            serde_json::Value::Array(items) => {
                let strings: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if strings.len() == items.len() {
                    Some(Self::List(strings))
                } else {
                    None
                }
            }
            serde_json::Value::Object(map) => {
                let inner: BTreeMap<String, MetadataValue> = map
                    .iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|mv| (k.clone(), mv)))
                    .collect();
                Some(Self::Map(inner))
            }
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// String-keyed metadata mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    /// Merge another mapping into this one, overwriting duplicate keys
    pub fn merge(&mut self, other: Metadata) {
        self.0.extend(other.0);
    }

    /// Superset containment: every key/value pair in `filter` must be
    /// present and structurally equal here. An empty filter matches
    /// everything.
    pub fn matches(&self, filter: &Metadata) -> bool {
        filter
            .0
            .iter()
            .all(|(key, value)| self.0.get(key) == Some(value))
    }

    /// Build a single-key filter
    pub fn single(key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        let mut m = Self::new();
        m.insert(key, value);
        m
    }

    /// Lossy conversion from a JSON object; non-objects yield None
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let map = value.as_object()?;
        let inner: BTreeMap<String, MetadataValue> = map
            .iter()
            .filter_map(|(k, v)| MetadataValue::from_json(v).map(|mv| (k.clone(), mv)))
            .collect();
        Some(Self(inner))
    }
}

impl FromIterator<(String, MetadataValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, MetadataValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
