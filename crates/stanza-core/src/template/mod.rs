//! Template language
//!
//! ## Syntax
//!
//! - Interpolation: `[[ user.name ]]`, with filters `[[ title | upper | truncate(20) ]]`.
//!   Output is HTML-escaped unless the pipeline contains `raw`.
//! - Conditionals: `[% if cond %] ... [% elseif cond %] ... [% else %] ... [% endif %]`
//! - Loops: `[% for item in items %] ... [% endfor %]`, with `loop.index`,
//!   `loop.index0`, `loop.first`, `loop.last` and `loop.length` in scope
//! - Macro calls: `##greet("World", user.name)##`, inserted unescaped
//! - Inheritance: `[% extends 'base' %]`, `[% block name %] ... [% endblock %]`
//!   and `[% super %]` inside an overriding block
//!
//! Paths that do not exist render as empty output and loop zero times.
//!
//! ## Pipeline
//!
//! `source → inherit → compile → CompiledUnit → exec → String`. The
//! [`CompiledUnit`] is pure data so the engine can cache it on disk.

mod blocks;
mod compile;
mod directive;
pub mod error;
mod exec;
pub mod inherit;
mod lexer;
pub mod unit;
pub(crate) mod value;

pub use compile::compile;
pub use error::TemplateError;
pub use exec::execute;
pub use inherit::{InheritanceResolver, ResolvedTemplate};
pub use unit::CompiledUnit;

use crate::error::Result;
use crate::registry::Registry;

/// Variable bindings for one render
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// Compile and execute a standalone template string
///
/// Inheritance markers are ignored: a string has no name to resolve parents
/// against.
pub fn render_str(source: &str, vars: &Variables, registry: &Registry) -> Result<String> {
    let unit = compile(source).map_err(|e| e.in_template("<string>"))?;
    execute(&unit, vars, registry)
}

#[cfg(test)]
mod tests;
