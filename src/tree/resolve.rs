//! Value resolution helpers.

use super::node::Container;
use serde_json::Value;
use std::fmt;

/// Result of a read: a parameter's effective value, or a whole namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Value(Value),
    Subtree(Container),
}

impl Resolved {
    /// Collapse into a plain value. A subtree becomes an object of the
    /// effective values below it.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Subtree(container) => container.effective_value(),
        }
    }

    pub fn as_subtree(&self) -> Option<&Container> {
        match self {
            Self::Subtree(container) => Some(container),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Subtree(container) => write!(f, "{}", container.effective_value()),
        }
    }
}

/// Truthiness used for value/default fallback.
///
/// `null`, `false`, zero and `""` are falsy. Arrays and objects are truthy
/// even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Walk into a compound value. Objects are indexed by key, arrays by
/// decimal index; anything else has no children.
///
/// A falsy member stepped into counts as missing, so `{"k": 0}` has no `k`.
pub(super) fn descend<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(value, |current, segment| {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        };
        next.filter(|value| is_truthy(value))
    })
}
