//! Filter and macro registry
//!
//! Templates call out to named callables in two ways:
//!
//! - **Filters** transform an interpolated value: `[[ title | upper ]]`
//! - **Macros** produce output from arguments: `##greet("World")##`
//!
//! A [`Registry`] maps names to callables. It is populated once during setup and
//! handed to the engine, which keeps it behind an `Arc` and never mutates it again,
//! so concurrent renders share it without locking.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised from inside a filter or macro
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallableError {
    message: String,
}

impl CallableError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A named value transform applied inside an interpolation pipeline
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, value: &Value, args: &[Value]) -> Result<Value, CallableError>;
}

/// A named callable invoked with `##name(args)##`
///
/// Macro output is inserted unescaped.
pub trait Macro: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, args: &[Value]) -> Result<Value, CallableError>;
}

type FilterFn = dyn Fn(&Value, &[Value]) -> Result<Value, CallableError> + Send + Sync;
type MacroFn = dyn Fn(&[Value]) -> Result<Value, CallableError> + Send + Sync;

/// Closure-backed [`Filter`]
pub struct FnFilter {
    name: String,
    func: Box<FilterFn>,
}

impl FnFilter {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl Filter for FnFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: &Value, args: &[Value]) -> Result<Value, CallableError> {
        (self.func)(value, args)
    }
}

/// Closure-backed [`Macro`]
pub struct FnMacro {
    name: String,
    func: Box<MacroFn>,
}

impl FnMacro {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl Macro for FnMacro {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, args: &[Value]) -> Result<Value, CallableError> {
        (self.func)(args)
    }
}

/// Name → callable dispatch table for filters and macros
#[derive(Default, Clone)]
pub struct Registry {
    filters: HashMap<String, Arc<dyn Filter>>,
    macros: HashMap<String, Arc<dyn Macro>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in filters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_all(&mut registry);
        registry
    }

    /// Register a filter under its own name, replacing any previous entry
    pub fn register_filter(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters
            .insert(filter.name().to_string(), Arc::new(filter));
        self
    }

    /// Register a macro under its own name, replacing any previous entry
    pub fn register_macro(&mut self, mac: impl Macro + 'static) -> &mut Self {
        self.macros.insert(mac.name().to_string(), Arc::new(mac));
        self
    }

    /// Register a closure as a filter
    pub fn filter_fn<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        self.register_filter(FnFilter::new(name, func))
    }

    /// Register a closure as a macro
    pub fn macro_fn<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        self.register_macro(FnMacro::new(name, func))
    }

    pub fn filter(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    pub fn macro_named(&self, name: &str) -> Option<&dyn Macro> {
        self.macros.get(name).map(|m| m.as_ref())
    }

    /// Registered filter names, sorted
    pub fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered macro names, sorted
    pub fn macro_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("filters", &self.filter_names())
            .field("macros", &self.macro_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_lookup_macro() {
        let mut registry = Registry::new();
        registry.macro_fn("greet", |args| {
            let who = args.first().and_then(Value::as_str).unwrap_or("nobody");
            Ok(Value::String(format!("Hello, {}!", who)))
        });

        let mac = registry.macro_named("greet").expect("greet should be registered");
        assert_eq!(mac.execute(&[json!("World")]).unwrap(), json!("Hello, World!"));
        assert!(registry.macro_named("missing").is_none());
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let mut registry = Registry::new();
        registry.filter_fn("twice", |v, _| Ok(v.clone()));
        registry.filter_fn("twice", |_, _| Ok(json!("replaced")));

        let filter = registry.filter("twice").unwrap();
        assert_eq!(filter.apply(&json!("x"), &[]).unwrap(), json!("replaced"));
        assert_eq!(registry.filter_names(), vec!["twice"]);
    }

    #[test]
    fn test_filters_and_macros_are_separate_namespaces() {
        let mut registry = Registry::new();
        registry.filter_fn("shared", |v, _| Ok(v.clone()));
        assert!(registry.filter("shared").is_some());
        assert!(registry.macro_named("shared").is_none());
    }

    #[test]
    fn test_callable_error_message() {
        let err = CallableError::new("bad argument");
        assert_eq!(err.to_string(), "bad argument");
        assert_eq!(err.message(), "bad argument");
    }

    #[test]
    fn test_with_builtins_registers_filters() {
        let registry = Registry::with_builtins();
        assert!(registry.filter("upper").is_some());
        assert!(registry.filter("join").is_some());
        assert!(registry.macro_names().is_empty());
    }
}
