//! Defaults and file names used across the engine

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "stanza.toml";

/// Template directory, relative to the config file
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Extension appended to template names that lack one
pub const DEFAULT_EXTENSION: &str = "tpl";

/// Artifact cache directory, relative to the config file
pub const DEFAULT_CACHE_DIR: &str = ".stanza/cache";

/// Cache artifact settings
pub mod artifact {
    /// File extension of compiled artifacts
    pub const EXTENSION: &str = "stc";

    /// First token of every artifact header line
    pub const MAGIC: &str = "stanza-artifact";

    /// Bumped whenever the serialized unit layout changes
    pub const FORMAT_VERSION: u32 = 1;
}
