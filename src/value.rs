//! Configuration values that drive template rendering.
//!
//! The configuration mapping is a tree of [`Value`]s assembled once per run and
//! passed read-only to every render call. Lookups never fail: a missing path
//! yields [`Value::Absent`], which is distinct from a present-but-empty string.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static ABSENT: Value = Value::Absent;

/// A configuration value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The looked-up path does not exist.
    #[default]
    Absent,
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Creates an empty mapping.
    pub fn mapping() -> Self {
        Value::Mapping(IndexMap::new())
    }

    /// Resolves `path` segment by segment, yielding [`Value::Absent`] as soon as a
    /// segment is missing or the current value cannot be indexed.
    ///
    /// Sequences are indexed by decimal segments (`items.0`).
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> &Value {
        let mut current = self;
        for segment in path {
            let segment = segment.as_ref();
            current = match current {
                Value::Mapping(map) => map.get(segment).unwrap_or(&ABSENT),
                Value::Sequence(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .unwrap_or(&ABSENT),
                _ => &ABSENT,
            };
        }
        current
    }

    /// Dotted-path convenience over [`Value::lookup`].
    pub fn get_path(&self, dotted: &str) -> &Value {
        let segments: Vec<&str> = dotted.split('.').collect();
        self.lookup(&segments)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Truthiness used by conditional helpers.
    ///
    /// Absent, null, `false`, the empty string, zero and empty sequences are falsy.
    /// Every mapping is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Absent | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(_) => true,
        }
    }

    /// Deep merge: mappings are merged key by key, anything else is replaced.
    /// An absent overlay leaves the current value untouched.
    pub fn merge(&mut self, other: Value) {
        match (self, other) {
            (_, Value::Absent) => {}
            (Value::Mapping(base), Value::Mapping(overlay)) => {
                for (key, value) in overlay {
                    match base.get_mut(&key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (slot, other) => *slot = other,
        }
    }

    /// Stores `value` at `path`, replacing non-mapping intermediates with mappings.
    pub fn set<S: AsRef<str>>(&mut self, path: &[S], value: Value) {
        match path.split_first() {
            None => *self = value,
            Some((head, rest)) => {
                if !matches!(self, Value::Mapping(_)) {
                    *self = Value::mapping();
                }
                if let Value::Mapping(map) = self {
                    map.entry(head.as_ref().to_string()).or_default().set(rest, value);
                }
            }
        }
    }

    /// Converts back to JSON. [`Value::Absent`] becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Absent | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Structural equality without type coercion: `"1"` never equals `1`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

/// Text form written into rendered templates.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent | Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Mapping(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Mapping(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
