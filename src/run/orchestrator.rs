// src/run/orchestrator.rs

//! Public entry point: resolve, start, supervise, apply the exit policy.

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::errors::{Result, RunError};
use crate::fs::FileSystem;
use crate::hooks::{Category, OutputSink};
use crate::resolve::ExecutableResolver;
use crate::run::context::RunContext;
use crate::run::monitor::supervise;
use crate::run::options::RunOptions;
use crate::types::OnFailure;

/// What the caller receives from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Captured lines joined with `\n`.
    pub output: String,
    pub exit_code: i32,
}

/// Result of the exit policy for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Hand the exit code back to the caller.
    Continue(i32),
    /// Terminate the host process with this exit code.
    Escalate(i32),
}

/// A finished run, before the exit decision is acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub output: RunOutput,
    pub decision: ExitDecision,
}

/// Run `command` with the process-wide executable resolver.
///
/// On a nonzero exit with [`OnFailure::Escalate`], the failure is reported to
/// `sink` and then the host process exits with the command's exit code.
pub async fn run(command: &str, options: &RunOptions, sink: &dyn OutputSink) -> Result<RunOutput> {
    run_with_resolver(command, options, sink, ExecutableResolver::global()).await
}

/// Same as [`run`], with an explicit resolver.
pub async fn run_with_resolver<F: FileSystem>(
    command: &str,
    options: &RunOptions,
    sink: &dyn OutputSink,
    resolver: &ExecutableResolver<F>,
) -> Result<RunOutput> {
    let execution = execute(command, options, sink, resolver).await?;
    match execution.decision {
        ExitDecision::Continue(_) => Ok(execution.output),
        ExitDecision::Escalate(code) => escalate(code),
    }
}

/// Resolve, start and supervise `command`, then apply the exit policy
/// without acting on an escalation.
pub async fn execute<F: FileSystem>(
    command: &str,
    options: &RunOptions,
    sink: &dyn OutputSink,
    resolver: &ExecutableResolver<F>,
) -> Result<Execution> {
    let (exe_path, args) = parse_command(command, resolver, &options.search_paths)?;
    let mut ctx = RunContext::new(exe_path, args, options)?;

    let shown = ctx.command_display();
    ctx.append_summary(&shown);
    sink.emit(Category::Info, &format!("{shown}: running"));

    ctx.start()?;
    supervise(&mut ctx, sink).await?;
    let decision = check_error(&mut ctx, sink)?;

    Ok(Execution {
        output: RunOutput {
            output: ctx.output(),
            exit_code: ctx.exit_code().unwrap_or_default(),
        },
        decision,
    })
}

/// Report the outcome of a finished run and decide whether to escalate.
///
/// The context's summary line must already name the command; the outcome is
/// appended to it.
pub fn check_error(ctx: &mut RunContext, sink: &dyn OutputSink) -> Result<ExitDecision> {
    let code = ctx
        .exit_code()
        .ok_or_else(|| RunError::InvalidState("run has no exit code yet".to_string()))?;

    if code == 0 {
        ctx.append_summary(&format!(": success: {code}"));
        sink.emit(Category::Success, ctx.summary());
        info!(exe = %ctx.exe_short_name(), "command succeeded");
        return Ok(ExitDecision::Continue(code));
    }

    ctx.append_summary(&format!(": command failed: {code}"));
    sink.emit(Category::Error, ctx.summary());
    sink.emit(Category::Error, &format!("{ctx:?}"));
    if ctx.is_muted() {
        sink.emit(Category::Error, &format!("process output:\n{}", ctx.output()));
    }
    error!(exe = %ctx.exe_short_name(), exit_code = code, on_failure = ?ctx.on_failure(), "command failed");

    Ok(match ctx.on_failure() {
        OnFailure::Tolerate => ExitDecision::Continue(code),
        OnFailure::Escalate => ExitDecision::Escalate(code),
    })
}

/// Terminate the host process with `code`.
pub fn escalate(code: i32) -> ! {
    debug!(exit_code = code, "escalating child failure to host exit");
    std::process::exit(code)
}

/// Split `command` into an executable and its arguments and resolve the
/// executable.
///
/// The executable name ends at the first whitespace; the remainder is
/// tokenized with shell-style quoting rules.
pub fn parse_command<F: FileSystem>(
    command: &str,
    resolver: &ExecutableResolver<F>,
    search_paths: &[PathBuf],
) -> Result<(PathBuf, Vec<String>)> {
    let command = command.trim();
    if command.is_empty() {
        return Err(RunError::invalid("command must not be empty"));
    }

    let (exe_name, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));

    let args = shlex::split(rest).ok_or_else(|| {
        RunError::invalid(format!("cannot tokenize arguments of {exe_name:?}: unbalanced quoting"))
    })?;

    let exe_path = resolver
        .resolve(exe_name, search_paths)
        .ok_or_else(|| RunError::ExecutableNotFound(exe_name.to_string()))?;

    Ok((exe_path, args))
}

/// Normalise a dynamically typed filter value into a list of patterns.
///
/// - absent → no filters
/// - a string → a single pattern (an empty string means no filters)
/// - an array → every item must be a string
/// - anything else → [`RunError::InvalidArgument`]
pub fn sanitize_filters(value: Option<&toml::Value>) -> Result<Vec<String>> {
    match value {
        None => Ok(Vec::new()),
        Some(toml::Value::String(s)) if s.is_empty() => Ok(Vec::new()),
        Some(toml::Value::String(s)) => Ok(vec![s.clone()]),
        Some(toml::Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                toml::Value::String(s) => Ok(s.clone()),
                other => Err(RunError::invalid(format!(
                    "filter at position {index} is not a string: {}",
                    other.type_str()
                ))),
            })
            .collect(),
        Some(other) => Err(RunError::invalid(format!(
            "expected a string or a list of strings for filters, got {}",
            other.type_str()
        ))),
    }
}
