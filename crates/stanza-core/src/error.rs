use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::CacheError;
use crate::path::ResolveError;
use crate::registry::CallableError;

/// Which registry a callable lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Filter,
    Macro,
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableKind::Filter => write!(f, "filter"),
            CallableKind::Macro => write!(f, "macro"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StanzaError {
    // Resolution errors
    #[error("TEMPLATE_NOT_FOUND: template '{0}' not found")]
    NotFound(String),

    #[error("TEMPLATE_UNSAFE_PATH: template name '{name}' rejected: {reason}")]
    UnsafePath { name: String, reason: String },

    // Inheritance errors
    #[error("PARENT_NOT_FOUND: template '{child}' extends '{parent}', which does not exist")]
    ParentNotFound { parent: String, child: String },

    #[error("CIRCULAR_INHERITANCE: {}", chain.join(" -> "))]
    CircularInheritance { chain: Vec<String> },

    // Compile errors
    #[error("SYNTAX_ERROR: {template}:{line}: {message}")]
    Syntax {
        template: String,
        line: usize,
        message: String,
    },

    // Execution errors
    #[error("UNREGISTERED_CALLABLE: {kind} '{name}' is not registered")]
    UnregisteredCallable { kind: CallableKind, name: String },

    #[error("EXECUTION_FAILURE: {kind} '{name}' failed: {source}")]
    ExecutionFailure {
        kind: CallableKind,
        name: String,
        #[source]
        source: CallableError,
    },

    // Environment errors
    #[error("DIRECTORY_ERROR: {path}: {reason}")]
    DirectoryError { path: PathBuf, reason: String },

    #[error("CACHE_ERROR: {0}")]
    Cache(#[from] CacheError),

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParseError(String),

    #[error("CONFIG_INVALID: {0}")]
    ConfigInvalid(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ResolveError> for StanzaError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound { name } => StanzaError::NotFound(name),
            ResolveError::Unsafe { name, reason } => StanzaError::UnsafePath { name, reason },
        }
    }
}

pub type Result<T> = std::result::Result<T, StanzaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_inheritance_lists_chain() {
        let err = StanzaError::CircularInheritance {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "CIRCULAR_INHERITANCE: a -> b -> a");
    }

    #[test]
    fn test_unregistered_callable_names_kind() {
        let err = StanzaError::UnregisteredCallable {
            kind: CallableKind::Macro,
            name: "greet".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("macro 'greet'"), "got: {}", msg);
    }

    #[test]
    fn test_resolve_error_conversion() {
        let err: StanzaError = ResolveError::NotFound {
            name: "missing".into(),
        }
        .into();
        assert!(matches!(err, StanzaError::NotFound(ref n) if n == "missing"));

        let err: StanzaError = ResolveError::Unsafe {
            name: "../x".into(),
            reason: "parent directory".into(),
        }
        .into();
        assert!(matches!(err, StanzaError::UnsafePath { .. }));
    }

    #[test]
    fn test_directory_error_display() {
        let err = StanzaError::DirectoryError {
            path: PathBuf::from("/srv/templates"),
            reason: "not a directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/templates"));
        assert!(msg.contains("not a directory"));
    }
}
