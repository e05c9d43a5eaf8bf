// src/fs/mod.rs

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// The filesystem queries executable resolution depends on.
pub trait FileSystem: Send + Sync + Debug {
    /// True if `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Directory relative paths are resolved against.
    fn current_dir(&self) -> Result<PathBuf>;

    /// Make `path` absolute without touching symlinks.
    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.current_dir()?.join(path))
        }
    }
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("reading current working directory")
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        std::path::absolute(path).with_context(|| format!("making {:?} absolute", path))
    }
}
