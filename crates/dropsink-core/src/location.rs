//! Destination location provider.

use std::path::{Path, PathBuf};

/// Supplies candidate destination directories and resolves the chosen one.
pub trait LocationProvider: Send + Sync {
    /// Candidate folder names. A blank entry denotes the storage root.
    fn list_candidates(&self) -> Vec<String>;

    /// Resolves a candidate name to a full directory path.
    fn resolve_chosen(&self, name: &str) -> PathBuf;

    /// Root-relative form of a resolved path, the shape the download
    /// subsystem expects for its destination directory.
    fn strip_root(&self, path: &Path) -> PathBuf;
}

/// Locations as configured: a fixed folder list under one root.
pub struct RootedLocations {
    root: PathBuf,
    folders: Vec<String>,
}

impl RootedLocations {
    pub fn new(root: impl Into<PathBuf>, folders: Vec<String>) -> Self {
        Self {
            root: root.into(),
            folders,
        }
    }
}

impl LocationProvider for RootedLocations {
    fn list_candidates(&self) -> Vec<String> {
        self.folders.clone()
    }

    fn resolve_chosen(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            self.root.clone()
        } else {
            self.root.join(name)
        }
    }

    fn strip_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}
