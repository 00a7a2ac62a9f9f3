//! Cache commands - clear and list compiled artifacts

use crate::context::Context;
use crate::output::print_json;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use stanza_core::cache::CacheEntryInfo;

/// Remove the artifact for `name`, or every artifact
pub fn clear(ctx: &Context, name: Option<&str>) -> Result<()> {
    let engine = ctx.engine()?;
    engine.clear_cache(name)?;

    match name {
        Some(name) => println!("{} Cleared cache for {}", "✓".green(), name),
        None => println!("{}", "Cache cleared successfully".green()),
    }
    Ok(())
}

/// List artifacts with their source template, dependencies and compile time
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let engine = ctx.engine()?;
    let entries = engine.cache_entries()?;

    if json {
        let output = json!({
            "cache_dir": engine.config().cache_dir.display().to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "entries": entries,
        });
        print_json(&serde_json::to_string_pretty(&output)?)?;
    } else {
        render_human(&entries);
    }
    Ok(())
}

fn render_human(entries: &[CacheEntryInfo]) {
    if entries.is_empty() {
        println!("No cached artifacts");
        return;
    }

    for entry in entries {
        let template = entry.template.as_deref().unwrap_or("(unknown template)");
        println!(
            "{} {} {}",
            entry.key.to_string().dimmed(),
            template.bold(),
            entry
                .compiled_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .cyan()
        );
        for dep in &entry.dependencies {
            println!("  ← {}", dep.display());
        }
    }

    println!("\n{} artifact(s)", entries.len());
}
