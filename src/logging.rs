// src/logging.rs

//! Logging setup for `procrun` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `PROCRUN_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. "info", "procrun::resolve=debug")
//! 3. default to `warn`
//!
//! The per-event echo under [`PROCESS_TARGET`] repeats every line the child
//! prints, so it is switched off unless `PROCRUN_LOG` names that target.
//!
//! Logs are sent to STDERR so that stdout carries only the command's output.

use anyhow::{Context, Result};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Target under which every sink event is traced.
pub const PROCESS_TARGET: &str = "procrun::process";

const ENV_VAR: &str = "PROCRUN_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(ENV_VAR).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let env = env.map(str::trim).filter(|s| !s.is_empty());

    let (mut filter, names_process) = match (cli_level, env) {
        (Some(lvl), _) => (level_only(level_filter(lvl)), false),
        (None, Some(directives)) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, directives.contains(PROCESS_TARGET)),
            Err(e) => {
                eprintln!("procrun: ignoring invalid {ENV_VAR}={directives:?}: {e}");
                (level_only(LevelFilter::WARN), false)
            }
        },
        (None, None) => (level_only(LevelFilter::WARN), false),
    };

    if !names_process {
        let quiet = format!("{PROCESS_TARGET}=off")
            .parse::<Directive>()
            .context("building process target directive")?;
        filter = filter.add_directive(quiet);
    }
    Ok(filter)
}

fn level_only(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy("")
}

fn level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_warn_with_process_echo_off() {
        let filter = build_filter(None, None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
        assert!(filter.to_string().contains("procrun::process=off"));
    }

    #[test]
    fn cli_level_wins_over_environment() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(filter.to_string().contains("procrun::process=off"));
    }

    #[test]
    fn environment_may_enable_process_echo() {
        let filter = build_filter(None, Some("warn,procrun::process=debug")).unwrap();
        let shown = filter.to_string();
        assert!(shown.contains("procrun::process=debug"));
        assert!(!shown.contains("procrun::process=off"));
    }

    #[test]
    fn invalid_environment_falls_back_to_warn() {
        let filter = build_filter(None, Some("procrun=verbose")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
