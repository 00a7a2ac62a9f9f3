//! Render orchestration
//!
//! Each call follows the same path:
//!
//! ```text
//! resolve name → cache lookup ─ hit ──────────────────────────────→ execute
//!                             └ miss/stale → read → inherit → compile → persist ┘
//! ```
//!
//! The engine holds no mutable state; everything shared between threads is
//! either immutable or lives on disk behind atomic renames.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::cache::{ArtifactCache, CacheEntryInfo, CacheKey, Lookup};
use crate::config::EngineConfig;
use crate::error::{Result, StanzaError};
use crate::path::{FileSystemResolver, PathResolver, ResolveError};
use crate::registry::Registry;
use crate::template::{compile, execute, CompiledUnit, InheritanceResolver, Variables};

/// Whether a compile request was served from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    Cached,
    Compiled,
}

/// Outcome of [`Engine::warm`]
#[derive(Debug, Default)]
pub struct WarmReport {
    pub compiled: Vec<String>,
    pub cached: Vec<String>,
    pub failed: Vec<(String, StanzaError)>,
}

impl WarmReport {
    pub fn total(&self) -> usize {
        self.compiled.len() + self.cached.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Engine {
    config: EngineConfig,
    resolver: Arc<dyn PathResolver>,
    registry: Arc<Registry>,
    cache: ArtifactCache,
}

impl Engine {
    /// Create an engine over the configured template directory
    ///
    /// Fails with `DirectoryError` if the template directory is missing or
    /// the cache directory cannot be created or written.
    pub fn new(config: EngineConfig, registry: impl Into<Arc<Registry>>) -> Result<Self> {
        check_template_dir(&config.template_dir)?;
        let resolver = FileSystemResolver::new(&config.template_dir, config.extension.as_str())
            .map_err(|e| StanzaError::DirectoryError {
                path: config.template_dir.clone(),
                reason: e.to_string(),
            })?;
        Self::with_resolver(config, Arc::new(resolver), registry)
    }

    /// Create an engine with a custom name resolver
    pub fn with_resolver(
        config: EngineConfig,
        resolver: Arc<dyn PathResolver>,
        registry: impl Into<Arc<Registry>>,
    ) -> Result<Self> {
        prepare_cache_dir(&config.cache_dir)?;
        Ok(Self {
            cache: ArtifactCache::new(config.cache_dir.clone()),
            config,
            resolver,
            registry: registry.into(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render `name` with `vars` merged over the engine defaults
    pub fn render(&self, name: &str, vars: &Variables) -> Result<String> {
        let (unit, _) = self.load_unit(name)?;
        let env = self.merge_vars(vars);
        execute(&unit, &env, &self.registry)
    }

    /// Whether `name` resolves to a template file
    pub fn exists(&self, name: &str) -> bool {
        self.resolver.resolve(name).is_ok()
    }

    /// Drop the artifact for `name`, or every artifact when `None`
    ///
    /// Clearing a template that has no artifact, or that does not exist, is a
    /// no-op.
    pub fn clear_cache(&self, name: Option<&str>) -> Result<()> {
        let Some(name) = name else {
            self.cache.clear()?;
            return Ok(());
        };

        match self.resolver.resolve(name) {
            Ok(path) => {
                let removed = self.cache.remove(&CacheKey::for_path(&path))?;
                debug!(template = name, removed, "cleared cache entry");
                Ok(())
            }
            Err(ResolveError::NotFound { .. }) => {
                debug!(template = name, "nothing to clear for unknown template");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Make sure a fresh artifact exists for `name` without executing it
    pub fn compile(&self, name: &str) -> Result<CompileStatus> {
        self.load_unit(name).map(|(_, status)| status)
    }

    /// Compile every template the resolver can list
    ///
    /// Per-template failures are collected rather than aborting the run.
    pub fn warm(&self) -> Result<WarmReport> {
        check_template_dir(&self.config.template_dir)?;
        prepare_cache_dir(&self.config.cache_dir)?;

        let mut report = WarmReport::default();
        for name in self.resolver.list() {
            match self.compile(&name) {
                Ok(CompileStatus::Compiled) => report.compiled.push(name),
                Ok(CompileStatus::Cached) => report.cached.push(name),
                Err(err) => report.failed.push((name, err)),
            }
        }
        info!(
            compiled = report.compiled.len(),
            cached = report.cached.len(),
            failed = report.failed.len(),
            "warmed cache"
        );
        Ok(report)
    }

    /// Artifacts currently on disk, labelled with their template names
    pub fn cache_entries(&self) -> Result<Vec<CacheEntryInfo>> {
        let names: HashMap<CacheKey, String> = self
            .resolver
            .list()
            .into_iter()
            .filter_map(|name| {
                let path = self.resolver.resolve(&name).ok()?;
                Some((CacheKey::for_path(&path), name))
            })
            .collect();

        let mut entries = self.cache.entries()?;
        for entry in &mut entries {
            entry.template = names.get(&entry.key).cloned();
        }
        Ok(entries)
    }

    /// Where the artifact for `name` lives (whether or not it exists yet)
    pub fn artifact_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.resolver.resolve(name)?;
        Ok(self.cache.artifact_path(&CacheKey::for_path(&path)))
    }

    fn load_unit(&self, name: &str) -> Result<(CompiledUnit, CompileStatus)> {
        let source_path = self.resolver.resolve(name)?;
        let key = CacheKey::for_path(&source_path);

        match self.cache.lookup(&key, &source_path) {
            Lookup::Hit(unit) => {
                debug!(template = name, %key, "cache hit");
                return Ok((unit, CompileStatus::Cached));
            }
            Lookup::Miss => debug!(template = name, %key, "cache miss"),
            Lookup::Stale { reason } => debug!(template = name, %key, %reason, "cache stale"),
        }

        let started = SystemTime::now();
        let (unit, dependencies) = self.build(name, &source_path)?;
        self.cache.store(&key, &unit, &dependencies, started)?;
        Ok((unit, CompileStatus::Compiled))
    }

    /// Read, resolve inheritance and compile; nothing is written
    fn build(&self, name: &str, source_path: &Path) -> Result<(CompiledUnit, Vec<PathBuf>)> {
        let source = fs::read_to_string(source_path)?;
        let resolved =
            InheritanceResolver::new(self.resolver.as_ref()).resolve(name, source_path, &source)?;
        let unit = compile(&resolved.source).map_err(|e| e.in_template(name))?;

        info!(
            template = name,
            ancestors = resolved.dependencies.len(),
            nodes = unit.nodes.len(),
            "compiled template"
        );
        Ok((unit, resolved.dependencies))
    }

    fn merge_vars(&self, vars: &Variables) -> Variables {
        let mut env = self.config.defaults.clone();
        env.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }
}

fn check_template_dir(dir: &Path) -> Result<()> {
    let reason = match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => "not a directory".to_string(),
        Err(e) => e.to_string(),
    };
    Err(StanzaError::DirectoryError {
        path: dir.to_path_buf(),
        reason,
    })
}

/// Create the cache directory if needed and prove it is writable
fn prepare_cache_dir(dir: &Path) -> Result<()> {
    let error = |reason: String| StanzaError::DirectoryError {
        path: dir.to_path_buf(),
        reason,
    };

    fs::create_dir_all(dir).map_err(|e| error(format!("cannot create cache directory: {}", e)))?;
    if !dir.is_dir() {
        return Err(error("not a directory".to_string()));
    }
    NamedTempFile::new_in(dir).map_err(|e| error(format!("cache directory not writable: {}", e)))?;
    Ok(())
}
