//! Shared test helpers for template tests

use serde_json::{json, Value};

use crate::error::Result;
use crate::registry::{CallableError, Registry};
use crate::template::{render_str, Variables};

/// Turn a `json!` object into render variables
pub(super) fn vars(value: Value) -> Variables {
    match value {
        Value::Object(map) => map,
        _ => Variables::new(),
    }
}

/// Render with the built-in filters only
pub(super) fn render(source: &str, data: Value) -> Result<String> {
    render_str(source, &vars(data), &Registry::with_builtins())
}

/// Render with the built-ins plus `greet` and `fail` macros
pub(super) fn render_with_macros(source: &str, data: Value) -> Result<String> {
    render_str(source, &vars(data), &macro_registry())
}

pub(super) fn macro_registry() -> Registry {
    let mut registry = Registry::with_builtins();
    registry
        .macro_fn("greet", |args| {
            let who = args.first().map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            Ok(json!(format!("Hello, {}!", who.unwrap_or_default())))
        })
        .macro_fn("fail", |_| Err(CallableError::new("macro exploded")))
        .macro_fn("html", |_| Ok(json!("<b>bold</b>")));
    registry
}

/// Shop-like data used across loop and conditional tests
pub(super) fn shop() -> Value {
    json!({
        "title": "Shop",
        "user": { "name": "Ada", "admin": true, "tags": [] },
        "items": [
            { "name": "Pen", "price": 2 },
            { "name": "Ink", "price": 12 },
            { "name": "Pad", "price": 5 }
        ],
        "empty": []
    })
}
