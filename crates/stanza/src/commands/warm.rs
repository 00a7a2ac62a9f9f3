//! Warm command - compile every template into the cache

use crate::context::Context;
use anyhow::{Result, anyhow};
use colored::Colorize;

/// Compile all templates, reporting counts and per-template failures
pub fn run(ctx: &Context) -> Result<()> {
    let engine = ctx.engine()?;

    if ctx.verbose {
        eprintln!(
            "Warming cache at {}...",
            engine.config().cache_dir.display()
        );
    }

    let report = engine.warm()?;

    if ctx.verbose {
        for name in &report.compiled {
            println!("  {} {}", "compiled".green(), name);
        }
        for name in &report.cached {
            println!("  {} {}", "cached".cyan(), name);
        }
    }
    for (name, err) in &report.failed {
        println!("{} {}: {}", "✗".red(), name, err);
    }

    println!(
        "{} {} compiled, {} cached, {} failed",
        "✓".green(),
        report.compiled.len(),
        report.cached.len(),
        report.failed.len()
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} template(s) failed to compile",
            report.failed.len()
        ))
    }
}
