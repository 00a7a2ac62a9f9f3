//! CLI command structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stanza")]
#[command(version, about = "Render and cache stanza templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to stanza.toml (defaults to ./stanza.toml when present)
    #[arg(long, global = true, env = "STANZA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Template directory, overriding the config file
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,

    /// Cache directory, overriding the config file
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template to stdout
    Render {
        /// Template name, relative to the template directory
        name: String,

        /// Variable binding (value parsed as JSON, else taken as a string)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// JSON object of variables; --var entries take precedence
        #[arg(long, value_name = "FILE")]
        vars_file: Option<PathBuf>,
    },

    /// Check whether a template exists (exit 1 when it does not)
    Exists { name: String },

    /// Compile every template into the cache
    Warm,

    /// Cache management
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove one template's artifact, or all artifacts
    Clear { name: Option<String> },

    /// List artifacts on disk
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
