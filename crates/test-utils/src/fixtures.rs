use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write `contents` as `procrun.toml` inside `dir`.
pub fn write_config(dir: &Path, contents: &str) -> Result<PathBuf> {
    let path = dir.join("procrun.toml");
    fs::write(&path, contents).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

/// Write an executable `sh` script named `name` inside `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("writing script {:?}", path))?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(path)
}
