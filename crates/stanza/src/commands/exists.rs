//! Exists command - check template resolution

use crate::context::Context;
use anyhow::Result;

/// Print `true` or `false`; exits with status 1 when the template is missing
pub fn run(ctx: &Context, name: &str) -> Result<()> {
    let found = ctx.engine()?.exists(name);
    println!("{}", found);
    if !found {
        std::process::exit(1);
    }
    Ok(())
}
