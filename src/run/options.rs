// src/run/options.rs

use std::path::PathBuf;

use encoding_rs::Encoding;

use crate::types::{DEFAULT_ENCODING, OnFailure};

/// Default wall-clock budget for a run, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 60.0;

/// Caller-supplied options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Extra roots searched for the executable, in order.
    pub search_paths: Vec<PathBuf>,
    pub cwd: PathBuf,
    /// Suppress live process output (it is still buffered).
    pub mute: bool,
    /// Exclusion patterns for output lines.
    pub filters: Vec<String>,
    pub on_failure: OnFailure,
    pub timeout_secs: f64,
    /// Encoding of the child's console output.
    pub encoding: &'static Encoding,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            cwd: PathBuf::from("."),
            mute: false,
            filters: Vec::new(),
            on_failure: OnFailure::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            encoding: DEFAULT_ENCODING,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_mute(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn with_filter(mut self, pattern: impl Into<String>) -> Self {
        self.filters.push(pattern.into());
        self
    }

    pub fn with_filters<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_on_failure(mut self, on_failure: OnFailure) -> Self {
        self.on_failure = on_failure;
        self
    }

    /// Shorthand for `with_on_failure(OnFailure::from_failure_ok(..))`.
    pub fn failure_ok(self, failure_ok: bool) -> Self {
        self.with_on_failure(OnFailure::from_failure_ok(failure_ok))
    }

    pub fn with_timeout_secs(mut self, timeout_secs: f64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}
