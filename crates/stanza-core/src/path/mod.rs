//! Template name resolution
//!
//! Template names are relative, `/`-separated identifiers such as
//! `layouts/base`. Resolving a name maps it to a file under the template root
//! and guarantees the result cannot escape that root.
//!
//! ## Platform semantics
//!
//! `Path::is_absolute()` differs between platforms: on Windows `/tmp` is rooted
//! but not absolute. Name validation therefore inspects components instead of
//! relying on `is_absolute()`:
//!
//! ```rust
//! use stanza_core::path::has_absolute_or_rooted_component;
//! use std::path::Path;
//!
//! assert!(has_absolute_or_rooted_component(Path::new("/tmp")));
//! assert!(!has_absolute_or_rooted_component(Path::new("layouts/base")));
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Why a template name could not be mapped to a file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("template '{name}' not found")]
    NotFound { name: String },

    #[error("template name '{name}' rejected: {reason}")]
    Unsafe { name: String, reason: String },
}

/// Maps template names to source files
///
/// Implementations must be shareable across rendering threads.
pub trait PathResolver: Send + Sync {
    /// Resolve `name` to an existing source file
    fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError>;

    /// Names of every template this resolver can see
    fn list(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Check if path is absolute OR rooted (cross-platform)
///
/// - Unix: `/tmp` → is_absolute() = true
/// - Windows: `/tmp` → is_absolute() = false (rooted, not absolute!)
/// - Windows: `C:\tmp` → is_absolute() = true
pub fn has_absolute_or_rooted_component(path: &Path) -> bool {
    if path.is_absolute() {
        return true;
    }

    // Windows `/tmp` case
    path.components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

/// Check that a template name is a plain relative path
///
/// Rejects empty names, absolute or rooted names, and any `.` or `..`
/// component.
///
/// # Examples
///
/// ```rust
/// use stanza_core::path::validate_template_name;
///
/// assert!(validate_template_name("layouts/base").is_ok());
/// assert!(validate_template_name("../secrets").is_err());
/// assert!(validate_template_name("/etc/passwd").is_err());
/// ```
pub fn validate_template_name(name: &str) -> Result<(), ResolveError> {
    let reject = |reason: &str| ResolveError::Unsafe {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(reject("name is empty"));
    }

    let path = Path::new(name);
    if has_absolute_or_rooted_component(path) {
        return Err(reject("name cannot be absolute or rooted"));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => return Err(reject("name cannot contain current directory (.)")),
            Component::ParentDir => {
                return Err(reject("name cannot contain parent directory (..)"))
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(reject("name cannot be absolute or rooted"))
            }
        }
    }

    // `Path::components` silently drops interior `.` segments
    if name.split(['/', '\\']).any(|part| part == ".") {
        return Err(reject("name cannot contain current directory (.)"));
    }

    Ok(())
}

/// Resolves names against a directory on disk
///
/// `layouts/base` with extension `tpl` maps to `<root>/layouts/base.tpl`.
/// Names that already carry the extension are used as-is.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
    extension: String,
}

impl FileSystemResolver {
    /// Create a resolver rooted at `root`
    ///
    /// The root is canonicalized so containment checks compare real paths.
    pub fn new(root: impl AsRef<Path>, extension: impl Into<String>) -> std::io::Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        let extension = extension.into().trim_start_matches('.').to_string();
        Ok(Self { root, extension })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn file_name_for(&self, name: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if self.extension.is_empty() || name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        }
    }
}

impl PathResolver for FileSystemResolver {
    fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError> {
        validate_template_name(name)?;

        let candidate = self.root.join(self.file_name_for(name));
        let not_found = || ResolveError::NotFound {
            name: name.to_string(),
        };

        // Symlinks are followed; the target must still live under the root
        let resolved = fs::canonicalize(&candidate).map_err(|_| not_found())?;
        if !resolved.starts_with(&self.root) {
            return Err(ResolveError::Unsafe {
                name: name.to_string(),
                reason: "resolves outside the template root".to_string(),
            });
        }
        if !resolved.is_file() {
            return Err(not_found());
        }
        Ok(resolved)
    }

    fn list(&self) -> Vec<String> {
        let suffix = format!(".{}", self.extension);
        let mut names: Vec<String> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                let relative = relative.to_str()?.replace('\\', "/");
                relative
                    .strip_suffix(&suffix)
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }
}
