use std::path::PathBuf;
use thiserror::Error;

/// Artifact cache failures
///
/// `Corrupt` never reaches callers of the engine: a corrupt artifact is a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("{operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact: {0}")]
    Serialization(String),

    #[error("corrupt artifact: {0}")]
    Corrupt(String),
}

impl CacheError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
