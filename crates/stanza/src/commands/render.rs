//! Render command - print a rendered template

use crate::context::Context;
use crate::output::print_raw;
use anyhow::{Context as _, Result, anyhow};
use serde_json::Value;
use stanza_core::Variables;
use std::fs;
use std::path::Path;

/// Render `name` to stdout
///
/// Variables from `--vars-file` are loaded first, then each `--var` is
/// applied on top.
pub fn run(ctx: &Context, name: &str, vars: &[String], vars_file: Option<&Path>) -> Result<()> {
    let mut variables = match vars_file {
        Some(path) => load_vars_file(path)?,
        None => Variables::new(),
    };
    for binding in vars {
        let (key, value) = parse_var(binding)?;
        variables.insert(key, value);
    }

    let engine = ctx.engine()?;
    let output = engine.render(name, &variables)?;
    print_raw(&output)?;
    Ok(())
}

fn load_vars_file(path: &Path) -> Result<Variables> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read vars file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!(
            "Vars file {} must contain a JSON object",
            path.display()
        )),
    }
}

/// Parse `key=value`; the value is JSON when it parses as JSON, else a string
fn parse_var(binding: &str) -> Result<(String, Value)> {
    let (key, raw) = binding
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid --var '{}': expected KEY=VALUE", binding))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Invalid --var '{}': empty key", binding));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
