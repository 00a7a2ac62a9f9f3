use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::artifact::{decode, encode, Artifact};
use super::error::CacheError;
use super::key::CacheKey;
use super::CacheEntryInfo;
use crate::config::consts::artifact::EXTENSION;
use crate::template::CompiledUnit;

/// Result of a cache lookup
#[derive(Debug)]
pub enum Lookup {
    /// Artifact is at least as new as the source and every dependency
    Hit(CompiledUnit),
    /// No usable artifact exists
    Miss,
    /// Artifact exists but something it was built from changed
    Stale { reason: String },
}

/// Directory of compiled artifacts, one file per template
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key, EXTENSION))
    }

    /// Look up the artifact for `source`, checking freshness
    ///
    /// An artifact is fresh when its mtime is no older than the source file
    /// and every recorded dependency. A missing dependency makes it stale.
    /// Unreadable or corrupt artifacts are reported as misses.
    pub fn lookup(&self, key: &CacheKey, source: &Path) -> Lookup {
        let path = self.artifact_path(key);

        let compiled_at = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(time) => time,
            Err(_) => return Lookup::Miss,
        };

        if let Some(reason) = newer_than(source, compiled_at) {
            return Lookup::Stale { reason };
        }

        let artifact = match fs::read_to_string(&path)
            .map_err(|e| CacheError::io("read", &path, e))
            .and_then(|text| decode(&text))
        {
            Ok(artifact) => artifact,
            Err(err) => {
                warn!(artifact = %path.display(), error = %err, "discarding unreadable artifact");
                return Lookup::Miss;
            }
        };

        for dependency in &artifact.dependencies {
            if let Some(reason) = newer_than(dependency, compiled_at) {
                return Lookup::Stale { reason };
            }
        }

        Lookup::Hit(artifact.unit)
    }

    /// Atomically write the artifact for `key`
    ///
    /// The file is written next to its final location and renamed into place,
    /// so concurrent readers see either the old or the new artifact. Its mtime
    /// is set to `compiled_at`, the instant before the sources were read, so
    /// an edit that lands while compiling leaves the artifact stale.
    pub fn store(
        &self,
        key: &CacheKey,
        unit: &CompiledUnit,
        dependencies: &[PathBuf],
        compiled_at: SystemTime,
    ) -> Result<PathBuf, CacheError> {
        let artifact = Artifact {
            unit: unit.clone(),
            dependencies: dependencies.to_vec(),
        };
        let content = encode(&artifact)?;
        let path = self.artifact_path(key);

        let mut temp_file =
            NamedTempFile::new_in(&self.dir).map_err(|e| CacheError::io("create temp file in", &self.dir, e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| CacheError::io("write", temp_file.path().to_path_buf(), e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| CacheError::io("sync", temp_file.path().to_path_buf(), e))?;
        temp_file
            .as_file()
            .set_modified(compiled_at)
            .map_err(|e| CacheError::io("set mtime of", temp_file.path().to_path_buf(), e))?;
        temp_file
            .persist(&path)
            .map_err(|e| CacheError::io("persist", &path, e.error))?;

        debug!(artifact = %path.display(), deps = dependencies.len(), "stored artifact");
        Ok(path)
    }

    /// Delete one artifact; returns whether it existed
    pub fn remove(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let path = self.artifact_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(artifact = %path.display(), "removed artifact");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io("remove", path, e)),
        }
    }

    /// Delete every artifact; returns how many were removed
    ///
    /// Only `*.stc` files are touched. A missing cache directory is empty.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.artifact_files()? {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io("remove", path, e)),
            }
        }
        info!(dir = %self.dir.display(), removed, "cleared artifact cache");
        Ok(removed)
    }

    /// Describe every readable artifact, sorted by key
    pub fn entries(&self) -> Result<Vec<CacheEntryInfo>, CacheError> {
        let mut entries = Vec::new();
        for path in self.artifact_files()? {
            let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(CacheKey::from_hex)
            else {
                continue;
            };

            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(CacheError::io("stat", path, e)),
            };
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(CacheError::io("read", path, e)),
            };
            let artifact = match decode(&text) {
                Ok(artifact) => artifact,
                Err(err) => {
                    warn!(artifact = %path.display(), error = %err, "skipping unreadable artifact");
                    continue;
                }
            };

            let compiled_at: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .map_err(|e| CacheError::io("stat", &path, e))?;

            entries.push(CacheEntryInfo {
                key,
                artifact: path,
                template: None,
                dependencies: artifact.dependencies,
                compiled_at,
                bytes: metadata.len(),
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn artifact_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io("read", &self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| CacheError::io("read", &self.dir, e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) && path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

/// Why `path` invalidates an artifact compiled at `compiled_at`, if it does
fn newer_than(path: &Path, compiled_at: SystemTime) -> Option<String> {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) if modified > compiled_at => {
            Some(format!("{} modified after compile", path.display()))
        }
        Ok(_) => None,
        Err(_) => Some(format!("{} is missing", path.display())),
    }
}
