use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Cache key: XXH3-128 of a template's absolute path, as 32 hex digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an absolute, canonical source path
    pub fn for_path(path: &Path) -> Self {
        let digest = xxh3_128(path.to_string_lossy().as_bytes());
        Self(format!("{:032x}", digest))
    }

    /// Parse a key back from an artifact file stem
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == 32 && hex.bytes().all(|b| b.is_ascii_hexdigit());
        valid.then(|| Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
