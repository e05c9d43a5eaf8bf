// src/fs/mock.rs

use super::FileSystem;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem holding a set of file paths and a fixed cwd.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashSet<PathBuf>>>,
    cwd: PathBuf,
}

impl MockFileSystem {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            files: Arc::new(Mutex::new(HashSet::new())),
            cwd: cwd.into(),
        }
    }

    /// Add a file. Relative paths are taken relative to the mock cwd.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = self.cwd.join(path.as_ref());
        self.files.lock().unwrap().insert(path);
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = self.cwd.join(path.as_ref());
        self.files.lock().unwrap().remove(&path);
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new("/mock")
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains(path)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}
