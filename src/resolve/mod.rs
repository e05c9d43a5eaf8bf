// src/resolve/mod.rs

//! Executable lookup with a memo of successful resolutions.
//!
//! Resolution order for a name (after appending the platform executable
//! suffix if it is missing):
//! 1. a previous successful lookup of the same suffixed name,
//! 2. the name taken as a path relative to the current directory,
//! 3. each extra search root, in order,
//! 4. the system `PATH` (only when no extra roots were given).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use tracing::{debug, info};

use crate::fs::{FileSystem, RealFileSystem};

#[derive(Debug)]
pub struct ExecutableResolver<F: FileSystem = RealFileSystem> {
    fs: F,
    known: Mutex<HashMap<String, PathBuf>>,
}

impl ExecutableResolver<RealFileSystem> {
    /// Process-wide resolver shared by every [`crate::run`] call.
    pub fn global() -> &'static ExecutableResolver<RealFileSystem> {
        static GLOBAL: OnceLock<ExecutableResolver<RealFileSystem>> = OnceLock::new();
        GLOBAL.get_or_init(|| ExecutableResolver::new(RealFileSystem))
    }
}

impl<F: FileSystem> ExecutableResolver<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            known: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `name` to an absolute path, or `None` if it cannot be found.
    pub fn resolve<P: AsRef<Path>>(&self, name: &str, roots: &[P]) -> Option<PathBuf> {
        let name = with_exe_suffix(name);

        if let Some(path) = self.lock_known().get(&name) {
            return Some(path.clone());
        }

        let found = self.lookup(&name, roots);
        match found {
            Some(ref path) => {
                info!(exe = %name, path = %path.display(), "executable resolved");
                self.lock_known().insert(name, path.clone());
            }
            None => debug!(exe = %name, "executable not found"),
        }
        found
    }

    /// Number of memoised lookups.
    pub fn cached(&self) -> usize {
        self.lock_known().len()
    }

    fn lookup<P: AsRef<Path>>(&self, name: &str, roots: &[P]) -> Option<PathBuf> {
        let candidates = std::iter::once(PathBuf::from(name))
            .chain(roots.iter().map(|root| root.as_ref().join(name)));

        for candidate in candidates {
            let Ok(abs) = self.fs.absolute(&candidate) else {
                continue;
            };
            if self.fs.is_file(&abs) {
                return Some(abs);
            }
        }

        if roots.is_empty() {
            return which::which(name).ok();
        }
        None
    }

    fn lock_known(&self) -> std::sync::MutexGuard<'_, HashMap<String, PathBuf>> {
        match self.known.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn with_exe_suffix(name: &str) -> String {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const NO_ROOTS: &[&str] = &[];

    fn exe(name: &str) -> String {
        with_exe_suffix(name)
    }

    #[test]
    fn explicit_path_wins_over_roots() {
        let fs = MockFileSystem::new("/work");
        fs.add_file(exe("tool"));
        fs.add_file(format!("/opt/bin/{}", exe("tool")));
        let resolver = ExecutableResolver::new(fs);

        let path = resolver.resolve("tool", &["/opt/bin"]).unwrap();
        assert_eq!(path, PathBuf::from("/work").join(exe("tool")));
    }

    #[test]
    fn roots_are_searched_in_order() {
        let fs = MockFileSystem::new("/work");
        fs.add_file(format!("/second/{}", exe("tool")));
        fs.add_file(format!("/third/{}", exe("tool")));
        let resolver = ExecutableResolver::new(fs);

        let path = resolver.resolve("tool", &["/first", "/second", "/third"]).unwrap();
        assert_eq!(path, PathBuf::from("/second").join(exe("tool")));
    }

    #[test]
    fn successful_lookup_is_memoised() {
        let fs = MockFileSystem::new("/work");
        fs.add_file(format!("/opt/bin/{}", exe("tool")));
        let resolver = ExecutableResolver::new(fs.clone());

        let first = resolver.resolve("tool", &["/opt/bin"]).unwrap();
        fs.remove_file(format!("/opt/bin/{}", exe("tool")));
        let second = resolver.resolve("tool", &["/elsewhere"]).unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn missing_executable_is_not_memoised() {
        let resolver = ExecutableResolver::new(MockFileSystem::new("/work"));
        assert_eq!(resolver.resolve("missing", &["/opt/bin"]), None);
        assert_eq!(resolver.cached(), 0);
    }

    #[test]
    fn falls_back_to_system_path_without_roots() {
        let resolver = ExecutableResolver::new(MockFileSystem::new("/nowhere"));
        assert_eq!(resolver.resolve("some-nonexistent-binary", NO_ROOTS), None);
    }
}
