//! Value helpers shared by the interpreter
//!
//! Template data is plain `serde_json::Value`. These helpers give it template
//! semantics: missing-safe path walking, emptiness, output conversion and
//! loose comparison.

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

use super::unit::Segment;

/// Walk `segments` starting from `value`
///
/// Any missing step yields `None`; a walk never fails.
pub(crate) fn walk<'a>(value: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(value, step)
}

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    }
}

/// "Is non-empty" test used for every condition
///
/// `null`, `false`, zero, `""`, `"0"`, empty arrays and empty objects are empty.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Convert a value to output text (before escaping)
pub(crate) fn to_output(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// HTML-entity escape `& < > " '`
pub(crate) fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Items a `for` loop iterates over; anything else iterates zero times
pub(crate) fn iter_items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// Equality with numeric normalization (`1 == 1.0`)
pub(crate) fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Ordering for numbers and strings; other combinations are unordered
pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
