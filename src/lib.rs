// src/lib.rs

pub mod capture;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod hooks;
pub mod logging;
pub mod resolve;
pub mod run;
pub mod types;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::hooks::{HookRegistry, register_console_hooks};

pub use crate::errors::RunError;
pub use crate::hooks::{Category, OutputSink};
pub use crate::resolve::ExecutableResolver;
pub use crate::run::{RunOptions, RunOutput, run};
pub use crate::types::{DEFAULT_ENCODING, OnFailure, parse_encoding};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (explicit `--config`, else `procrun.toml` if present)
/// - console hooks
/// - the supervised run itself
///
/// A failing command with the default policy terminates the process from
/// inside [`run`]; a tolerated failure returns normally.
pub async fn run_cli(args: CliArgs) -> Result<RunOutput> {
    let config = load_config(&args)?;

    let registry = HookRegistry::new(config.missing_hook_policy());
    register_console_hooks(&registry);

    let options = args.run_options(&config);
    let command = args.command_string()?;
    debug!(%command, ?options, "running command from CLI");

    Ok(run(&command, &options, &registry).await?)
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    if let Some(ref path) = args.config {
        return Ok(load_and_validate(path)?);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading default config file");
        return Ok(load_and_validate(&default_path)?);
    }

    Ok(ConfigFile::default())
}
