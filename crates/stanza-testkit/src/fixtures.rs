//! Template directory fixtures
//!
//! A [`TemplateTree`] is a throwaway project layout:
//!
//! ```text
//! <tmp>/
//! ├── stanza.toml        (optional)
//! ├── templates/*.tpl
//! └── cache/
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::temp_dir_in_workspace;

/// Extension written by [`TemplateTree::write`]
pub const TEMPLATE_EXTENSION: &str = "tpl";

pub struct TemplateTree {
    temp: TempDir,
    templates: PathBuf,
    cache: PathBuf,
}

impl TemplateTree {
    /// Empty tree with a `templates/` directory; `cache/` is not created
    pub fn new() -> Self {
        let temp = temp_dir_in_workspace();
        let templates = temp.path().join("templates");
        std::fs::create_dir_all(&templates).expect("Failed to create templates directory");
        let cache = temp.path().join("cache");
        Self {
            temp,
            templates,
            cache,
        }
    }

    /// Tree pre-populated with `(name, body)` templates
    pub fn with(templates: &[(&str, &str)]) -> Self {
        let tree = Self::new();
        for (name, body) in templates {
            tree.write(name, body);
        }
        tree
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache
    }

    /// Path of template `name` (extension appended)
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.templates
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }

    /// Write (or overwrite) template `name`, creating subdirectories
    pub fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.template_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create template subdirectory");
        }
        std::fs::write(&path, body)
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
        path
    }

    /// Write `stanza.toml` at the tree root
    pub fn write_config(&self, body: &str) -> PathBuf {
        let path = self.root().join("stanza.toml");
        std::fs::write(&path, body).expect("Failed to write stanza.toml");
        path
    }

    /// Every file currently in the cache directory
    pub fn cache_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.cache) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        files
    }
}

impl Default for TemplateTree {
    fn default() -> Self {
        Self::new()
    }
}
