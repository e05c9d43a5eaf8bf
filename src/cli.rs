// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use encoding_rs::Encoding;

use crate::config::ConfigFile;
use crate::run::RunOptions;
use crate::types::{OnFailure, parse_encoding};

/// Command-line arguments for `procrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procrun",
    version,
    about = "Run a command with output capture, line filtering and a timeout.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML) with run defaults.
    ///
    /// Default: `procrun.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for the command.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Do not print the command's output while it runs.
    #[arg(long)]
    pub mute: bool,

    /// Drop output lines starting with a match of this regex (repeatable).
    #[arg(long = "filter", value_name = "REGEX")]
    pub filters: Vec<String>,

    /// Return the command's failure instead of exiting with its code.
    #[arg(long)]
    pub failure_ok: bool,

    /// Timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Extra directory to search for the executable (repeatable).
    #[arg(long = "path", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Encoding of the command's output, by label (utf-8, cp1252, shift_jis, ...).
    #[arg(long, value_name = "LABEL", value_parser = parse_encoding)]
    pub encoding: Option<&'static Encoding>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Executable followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Re-join the command words into one command string, quoting where needed.
    pub fn command_string(&self) -> anyhow::Result<String> {
        Ok(shlex::try_join(self.command.iter().map(String::as_str))?)
    }

    /// Layer the CLI flags over the config file's run defaults.
    pub fn run_options(&self, config: &ConfigFile) -> RunOptions {
        let mut options = config.run_options().clone();

        if let Some(ref cwd) = self.cwd {
            options.cwd = cwd.clone();
        }
        if self.mute {
            options.mute = true;
        }
        options.filters.extend(self.filters.iter().cloned());
        if self.failure_ok {
            options.on_failure = OnFailure::Tolerate;
        }
        if let Some(timeout) = self.timeout {
            options.timeout_secs = timeout;
        }
        options.search_paths.extend(self.paths.iter().cloned());
        if let Some(encoding) = self.encoding {
            options.encoding = encoding;
        }
        options
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
