//! Global context for CLI commands

use crate::cli::Cli;
use anyhow::{Context as _, Result, anyhow};
use stanza_core::config::consts::CONFIG_FILE;
use stanza_core::{Config, Engine, EngineConfig, Registry};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings every command starts from
pub struct Context {
    pub config: EngineConfig,
    pub verbose: bool,
}

impl Context {
    /// Build engine settings from stanza.toml and command-line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit `--config` file does not exist
    /// - The config file cannot be parsed or is invalid
    pub fn new(cli: &Cli) -> Result<Self> {
        let cwd = env::current_dir()?;
        let (config, base_dir) = load_config(cli.config.as_deref(), &cwd)?;
        let mut engine_config = EngineConfig::from_config(config, &base_dir);

        if let Some(templates) = &cli.templates {
            engine_config.template_dir = cwd.join(templates);
        }
        if let Some(cache_dir) = &cli.cache_dir {
            engine_config.cache_dir = cwd.join(cache_dir);
        }

        debug!(
            template_dir = %engine_config.template_dir.display(),
            cache_dir = %engine_config.cache_dir.display(),
            "resolved engine settings"
        );

        Ok(Self {
            config: engine_config,
            verbose: cli.verbose,
        })
    }

    /// Engine with the built-in filters
    pub fn engine(&self) -> Result<Engine> {
        Ok(Engine::new(self.config.clone(), Registry::with_builtins())?)
    }
}

/// Explicit config, else `./stanza.toml`, else defaults rooted at `cwd`
fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<(Config, PathBuf)> {
    let path = match explicit {
        Some(path) => {
            let path = cwd.join(path);
            if !path.is_file() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
            path
        }
        None => {
            let path = cwd.join(CONFIG_FILE);
            if !path.is_file() {
                return Ok((Config::default(), cwd.to_path_buf()));
            }
            path
        }
    };

    let config =
        Config::from_file(&path).with_context(|| format!("Failed to load {}", path.display()))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());
    Ok((config, base_dir))
}
