//! Modification-time helpers
//!
//! Cache freshness compares mtimes, and many filesystems only keep second
//! resolution. Tests move files into the past instead of sleeping.

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Set the modification time of `path`
pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .unwrap_or_else(|e| panic!("Failed to set mtime of {}: {}", path.display(), e));
}

/// Set the modification time of `path` to `secs` seconds ago
pub fn backdate(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() - Duration::from_secs(secs));
}

/// Backdate every regular file directly or indirectly under `dir`
pub fn backdate_all(dir: &Path, secs: u64) {
    let entries = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e));
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            backdate_all(&path, secs);
        } else if path.is_file() {
            backdate(&path, secs);
        }
    }
}

/// Current modification time of `path`
pub fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|e| panic!("Failed to stat {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdate_moves_mtime_into_past() {
        let temp = crate::temp_dir_in_workspace();
        let file = temp.path().join("f");
        std::fs::write(&file, "x").unwrap();

        backdate(&file, 500);
        let age = SystemTime::now().duration_since(mtime(&file)).unwrap();
        assert!(age >= Duration::from_secs(499), "age was {:?}", age);
    }

    #[test]
    fn test_backdate_all_recurses() {
        let temp = crate::temp_dir_in_workspace();
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("f"), "x").unwrap();

        backdate_all(temp.path(), 100);
        let age = SystemTime::now()
            .duration_since(mtime(&nested.join("f")))
            .unwrap();
        assert!(age >= Duration::from_secs(99));
    }
}
