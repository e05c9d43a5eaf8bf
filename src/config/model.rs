// src/config/model.rs

use std::path::PathBuf;

use encoding_rs::Encoding;
use serde::Deserialize;

use crate::run::options::{DEFAULT_TIMEOUT_SECS, RunOptions};
use crate::types::{DEFAULT_ENCODING, MissingHookPolicy, OnFailure, deserialize_encoding};

/// Configuration file as read from TOML, before validation.
///
/// ```toml
/// [run]
/// cwd = "."
/// mute = false
/// filters = ["^warning"]
/// failure_ok = false
/// timeout = 60
/// encoding = "cp1252"
/// paths = ["/opt/tools/bin"]
///
/// [hooks]
/// missing = "print"
/// ```
///
/// All sections are optional and have the same defaults as [`RunOptions`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub hooks: HooksSection,
}

/// `[run]` section: defaults for every run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default)]
    pub cwd: Option<String>,

    #[serde(default)]
    pub mute: bool,

    /// A single pattern or a list of patterns. Kept untyped here and checked
    /// by `sanitize_filters` during validation.
    #[serde(default)]
    pub filters: Option<toml::Value>,

    #[serde(default)]
    pub failure_ok: bool,

    /// Seconds; integers are accepted.
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Any label known to `encoding_rs`.
    #[serde(default = "default_encoding", deserialize_with = "deserialize_encoding")]
    pub encoding: &'static Encoding,

    /// Extra roots searched for executables, in order.
    #[serde(default)]
    pub paths: Vec<String>,
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_encoding() -> &'static Encoding {
    DEFAULT_ENCODING
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            cwd: None,
            mute: false,
            filters: None,
            failure_ok: false,
            timeout: default_timeout(),
            encoding: DEFAULT_ENCODING,
            paths: Vec::new(),
        }
    }
}

/// `[hooks]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HooksSection {
    /// What to do with messages of a category that has no hook.
    #[serde(default)]
    pub missing: MissingHookPolicy,
}

/// Validated configuration.
///
/// Build it with `ConfigFile::try_from(raw)`, which runs the checks in
/// `validate.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    run: RunOptions,
    missing_hook: MissingHookPolicy,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(run: RunOptions, missing_hook: MissingHookPolicy) -> Self {
        Self { run, missing_hook }
    }

    /// Run defaults described by the file.
    pub fn run_options(&self) -> &RunOptions {
        &self.run
    }

    pub fn missing_hook_policy(&self) -> MissingHookPolicy {
        self.missing_hook
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RunOptions::default(), MissingHookPolicy::default())
    }
}

impl RunSection {
    pub(crate) fn to_options(&self, filters: Vec<String>) -> RunOptions {
        RunOptions {
            search_paths: self.paths.iter().map(PathBuf::from).collect(),
            cwd: self.cwd.as_deref().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")),
            mute: self.mute,
            filters,
            on_failure: OnFailure::from_failure_ok(self.failure_ok),
            timeout_secs: self.timeout,
            encoding: self.encoding,
        }
    }
}
