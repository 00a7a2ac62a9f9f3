use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::consts::{DEFAULT_CACHE_DIR, DEFAULT_EXTENSION, DEFAULT_TEMPLATE_DIR};
use crate::error::{Result, StanzaError};
use crate::template::Variables;

/// stanza.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Engine-level variables; render-time variables win on conflict
    #[serde(default)]
    pub defaults: Variables,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_template_root")]
    pub root: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_template_root(),
            extension: default_extension(),
        }
    }
}

fn default_template_root() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE_DIR)
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

impl Config {
    /// Read stanza.toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StanzaError::ConfigParseError(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StanzaError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write stanza.toml
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StanzaError::ConfigParseError(e.to_string()))?;

        std::fs::write(path.as_ref(), content).map_err(StanzaError::IoError)?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let ext = &self.templates.extension;
        if ext.contains(['/', '\\']) || ext.trim() != ext {
            return Err(StanzaError::ConfigInvalid(format!(
                "templates.extension '{}' must be a plain file extension",
                ext
            )));
        }
        Ok(())
    }
}

/// Fully resolved engine settings
///
/// Paths are absolute or relative to the process working directory; nothing
/// here is re-resolved later.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub template_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub extension: String,
    pub defaults: Variables,
}

impl EngineConfig {
    /// Settings with default extension and no default variables
    pub fn new(template_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            cache_dir: cache_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            defaults: Variables::new(),
        }
    }

    /// Resolve a parsed config against the directory holding stanza.toml
    pub fn from_config(config: Config, base_dir: &Path) -> Self {
        Self {
            template_dir: base_dir.join(config.templates.root),
            cache_dir: base_dir.join(config.cache.dir),
            extension: config.templates.extension,
            defaults: config.defaults,
        }
    }

    pub fn with_defaults(mut self, defaults: Variables) -> Self {
        self.defaults = defaults;
        self
    }
}
