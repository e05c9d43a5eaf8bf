// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("process timeout: {exe} did not finish within {timeout_secs} seconds")]
    Timeout { exe: String, timeout_secs: f64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid run state: {0}")]
    InvalidState(String),

    #[error("failed to spawn {exe}: {source}")]
    Spawn {
        exe: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl RunError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RunError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_executable_and_budget() {
        let err = RunError::Timeout {
            exe: "sleep".to_string(),
            timeout_secs: 0.5,
        };
        assert_eq!(
            err.to_string(),
            "process timeout: sleep did not finish within 0.5 seconds"
        );
    }

    #[test]
    fn io_errors_convert_and_keep_their_message() {
        let err: RunError = std::io::Error::other("pipe closed").into();
        assert!(matches!(err, RunError::Io(_)));
        assert_eq!(err.to_string(), "IO error: pipe closed");
    }
}
