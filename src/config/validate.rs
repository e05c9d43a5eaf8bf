// src/config/validate.rs

use crate::capture::LineFilter;
use crate::config::model::{ConfigFile, RawConfigFile, RunSection};
use crate::errors::{Result, RunError};
use crate::run::orchestrator::sanitize_filters;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let filters = validate_run_section(&raw.run)?;
        Ok(ConfigFile::new_unchecked(
            raw.run.to_options(filters),
            raw.hooks.missing,
        ))
    }
}

/// Check the `[run]` section and return its sanitised filter list.
fn validate_run_section(run: &RunSection) -> Result<Vec<String>> {
    validate_timeout(run.timeout)?;
    validate_cwd(run.cwd.as_deref())?;
    validate_paths(&run.paths)?;

    let filters = sanitize_filters(run.filters.as_ref())
        .map_err(|e| RunError::ConfigError(format!("[run].filters: {e}")))?;
    LineFilter::new(&filters).map_err(|e| RunError::ConfigError(format!("[run].filters: {e}")))?;
    Ok(filters)
}

fn validate_timeout(timeout: f64) -> Result<()> {
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(RunError::ConfigError(format!(
            "[run].timeout must be a positive number of seconds (got {timeout})"
        )));
    }
    Ok(())
}

fn validate_cwd(cwd: Option<&str>) -> Result<()> {
    if cwd.is_some_and(str::is_empty) {
        return Err(RunError::ConfigError(
            "[run].cwd must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(paths: &[String]) -> Result<()> {
    for (index, path) in paths.iter().enumerate() {
        if path.is_empty() {
            return Err(RunError::ConfigError(format!(
                "[run].paths entry at position {index} is empty"
            )));
        }
    }
    Ok(())
}
