mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{CacheCommands, Cli, Commands};
use context::Context;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "STANZA_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Context::new(&cli).and_then(|ctx| match cli.command {
        Commands::Render {
            name,
            vars,
            vars_file,
        } => commands::render::run(&ctx, &name, &vars, vars_file.as_deref()),
        Commands::Exists { name } => commands::exists::run(&ctx, &name),
        Commands::Warm => commands::warm::run(&ctx),
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Clear { name } => commands::cache::clear(&ctx, name.as_deref()),
            CacheCommands::List { json } => commands::cache::list(&ctx, json),
        },
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
