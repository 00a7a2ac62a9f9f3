//! Compiled artifact cache
//!
//! Artifacts live in a flat directory keyed by a hash of the template's
//! absolute path. Freshness is decided by file modification times: an
//! artifact is valid while its own mtime is no older than the template and
//! every ancestor recorded in its dependency line.

mod artifact;
mod error;
mod key;
mod store;

pub use artifact::Artifact;
pub use error::CacheError;
pub use key::CacheKey;
pub use store::{ArtifactCache, Lookup};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Summary of one artifact on disk
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub key: CacheKey,
    pub artifact: PathBuf,
    /// Template name, when the artifact belongs to a template the engine can see
    pub template: Option<String>,
    pub dependencies: Vec<PathBuf>,
    pub compiled_at: DateTime<Utc>,
    pub bytes: u64,
}
