//! Built-in filters
//!
//! Registered by [`Registry::with_builtins`](crate::registry::Registry::with_builtins).
//! `raw` is not listed here; the compiler handles it.

use serde_json::Value;

use crate::registry::{CallableError, Registry};
use crate::template::value::is_truthy;

/// Register every built-in filter into `registry`
pub fn register_all(registry: &mut Registry) {
    registry
        .filter_fn("upper", |v, _| map_text(v, |s| s.to_uppercase()))
        .filter_fn("lower", |v, _| map_text(v, |s| s.to_lowercase()))
        .filter_fn("trim", |v, _| map_text(v, |s| s.trim().to_string()))
        .filter_fn("capitalize", |v, _| map_text(v, capitalize))
        .filter_fn("length", |v, _| Ok(length(v)))
        .filter_fn("default", default)
        .filter_fn("join", join)
        .filter_fn("truncate", truncate)
        .filter_fn("json", |v, _| {
            serde_json::to_string(v)
                .map(Value::String)
                .map_err(|e| CallableError::new(e.to_string()))
        });
}

/// Text form of a value as filters see it
fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn map_text(value: &Value, f: impl Fn(&str) -> String) -> Result<Value, CallableError> {
    Ok(Value::String(f(&text_of(value))))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn length(value: &Value) -> Value {
    let len = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => other.to_string().chars().count(),
    };
    Value::from(len)
}

/// `default(fallback)`: fallback when the value is empty
fn default(value: &Value, args: &[Value]) -> Result<Value, CallableError> {
    let fallback = args
        .first()
        .ok_or_else(|| CallableError::new("default requires a fallback argument"))?;
    if is_truthy(value) {
        Ok(value.clone())
    } else {
        Ok(fallback.clone())
    }
}

/// `join(sep)`: join array items; separator defaults to `, `
fn join(value: &Value, args: &[Value]) -> Result<Value, CallableError> {
    let sep = match args.first() {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(CallableError::new(format!(
                "join separator must be a string, got {}",
                other
            )))
        }
        None => ", ",
    };
    let joined = match value {
        Value::Array(items) => items.iter().map(text_of).collect::<Vec<_>>().join(sep),
        other => text_of(other),
    };
    Ok(Value::String(joined))
}

/// `truncate(n)`: keep the first `n` characters
fn truncate(value: &Value, args: &[Value]) -> Result<Value, CallableError> {
    let limit = args
        .first()
        .and_then(Value::as_u64)
        .ok_or_else(|| CallableError::new("truncate requires a non-negative integer length"))?;
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    Ok(Value::String(text_of(value).chars().take(limit).collect()))
}
