// src/run/context.rs

//! State of one supervised execution.
//!
//! A [`RunContext`] goes through `Constructed -> Started -> Completed` or
//! `Constructed -> Started -> TimedOut`, never skipping a state and never
//! going back. It owns exactly one child process for its whole life.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::capture::{LineFilter, OutputCapture};
use crate::errors::{Result, RunError};
use crate::hooks::OutputSink;
use crate::run::options::RunOptions;
use crate::types::OnFailure;

/// Exit code recorded when the process exceeded its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

/// Lifecycle state of a [`RunContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Constructed,
    Started,
    Completed,
    TimedOut,
}

pub struct RunContext {
    exe_path: PathBuf,
    args: Vec<String>,
    search_paths: Vec<PathBuf>,
    cwd: PathBuf,
    timeout_secs: f64,
    timeout: Duration,
    on_failure: OnFailure,
    capture: OutputCapture,
    summary: String,
    exit_code: Option<i32>,
    started_at: Option<Instant>,
    child: Option<Child>,
    state: RunState,
}

impl RunContext {
    /// Validate every input and build a context in the `Constructed` state.
    pub fn new(exe_path: PathBuf, args: Vec<String>, options: &RunOptions) -> Result<Self> {
        check_exe_path(&exe_path)?;
        check_args(&args)?;
        check_search_paths(&options.search_paths)?;
        check_cwd(&options.cwd)?;
        let timeout = check_timeout(options.timeout_secs)?;
        let filter = LineFilter::new(&options.filters)?;

        Ok(Self {
            exe_path,
            args,
            search_paths: options.search_paths.clone(),
            cwd: options.cwd.clone(),
            timeout_secs: options.timeout_secs,
            timeout,
            on_failure: options.on_failure,
            capture: OutputCapture::new(filter, options.encoding, options.mute),
            summary: String::new(),
            exit_code: None,
            started_at: None,
            child: None,
            state: RunState::Constructed,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The exit code, once the run reached a terminal state.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn exe_path(&self) -> &Path {
        &self.exe_path
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timeout_secs(&self) -> f64 {
        self.timeout_secs
    }

    pub fn is_muted(&self) -> bool {
        self.capture.is_muted()
    }

    pub fn on_failure(&self) -> OnFailure {
        self.on_failure
    }

    /// File name of the executable, used in timeout reports.
    pub fn exe_short_name(&self) -> String {
        self.exe_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.exe_path.display().to_string())
    }

    pub fn absolute_cwd(&self) -> PathBuf {
        std::path::absolute(&self.cwd).unwrap_or_else(|_| self.cwd.clone())
    }

    /// `"<exe> <args>" in "<cwd>"`, as shown in run reports.
    pub fn command_display(&self) -> String {
        let mut cmd = self.exe_path.display().to_string();
        if !self.args.is_empty() {
            cmd.push(' ');
            cmd.push_str(&self.args.join(" "));
        }
        format!("\"{}\" in \"{}\"", cmd, self.absolute_cwd().display())
    }

    pub fn output_lines(&self) -> &[String] {
        self.capture.lines()
    }

    /// Output captured so far, joined with newlines.
    pub fn output(&self) -> String {
        self.capture.joined()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub(crate) fn append_summary(&mut self, text: &str) {
        self.summary.push_str(text);
    }

    pub(crate) fn capture_mut(&mut self) -> &mut OutputCapture {
        &mut self.capture
    }

    /// Spawn the child process and start the clock.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.state != RunState::Constructed || self.child.is_some() {
            return Err(RunError::InvalidState(format!(
                "cannot start a run in state {:?}",
                self.state
            )));
        }

        let mut cmd = Command::new(&self.exe_path);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Both streams write into one pipe so the kernel keeps their order.
        #[cfg(unix)]
        let combined = {
            let (reader, writer) = std::io::pipe()?;
            cmd.stdout(writer.try_clone()?).stderr(writer);
            reader
        };
        #[cfg(not(unix))]
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let spawned = cmd.spawn();
        // The command still holds the parent's write ends; EOF needs them closed.
        drop(cmd);
        let child = spawned.map_err(|source| RunError::Spawn {
            exe: self.exe_short_name(),
            source,
        })?;

        #[cfg(unix)]
        {
            let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(combined.into())?;
            self.capture.attach(receiver, "combined");
        }
        #[cfg(not(unix))]
        let mut child = child;
        #[cfg(not(unix))]
        {
            if let Some(stdout) = child.stdout.take() {
                self.capture.attach(stdout, "stdout");
            }
            if let Some(stderr) = child.stderr.take() {
                self.capture.attach(stderr, "stderr");
            }
        }
        self.capture.seal();

        self.started_at = Some(Instant::now());
        self.child = Some(child);
        self.state = RunState::Started;

        info!(
            exe = %self.exe_path.display(),
            args = ?self.args,
            cwd = %self.absolute_cwd().display(),
            "process started"
        );
        Ok(())
    }

    /// Drain any output the child has produced, without waiting.
    pub fn drain(&mut self, sink: &dyn OutputSink) -> usize {
        self.capture.drain(sink)
    }

    /// Non-blocking completion check. Returns the exit code once the child
    /// has exited.
    pub fn poll_exit(&mut self) -> Result<Option<i32>> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| RunError::InvalidState("process not started".to_string()))?;
        let status = child.try_wait()?;
        Ok(status.map(exit_code_of))
    }

    /// True once the wall-clock budget since launch is exceeded.
    pub fn is_timed_out(&self) -> Result<bool> {
        let started_at = self
            .started_at
            .ok_or_else(|| RunError::InvalidState("process not started".to_string()))?;
        Ok(started_at.elapsed() > self.timeout)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    pub(crate) fn mark_completed(&mut self, code: i32) -> Result<()> {
        self.expect_started("complete")?;
        self.exit_code = Some(code);
        self.state = RunState::Completed;
        Ok(())
    }

    /// Record the timeout and kill the child.
    pub(crate) fn mark_timed_out(&mut self) -> Result<()> {
        self.expect_started("time out")?;
        self.exit_code = Some(TIMEOUT_EXIT_CODE);
        self.state = RunState::TimedOut;

        let exe = self.exe_short_name();
        if let Some(child) = self.child.as_mut() {
            match child.start_kill() {
                Ok(()) => debug!(%exe, "timed-out process killed"),
                Err(e) => warn!(%exe, error = %e, "failed to kill timed-out process"),
            }
        }
        Ok(())
    }

    fn expect_started(&self, action: &str) -> Result<()> {
        if self.state != RunState::Started {
            return Err(RunError::InvalidState(format!(
                "cannot {action} a run in state {:?}",
                self.state
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("exe_path", &self.exe_path)
            .field("args", &self.args)
            .field("search_paths", &self.search_paths)
            .field("cwd", &self.cwd)
            .field("timeout_secs", &self.timeout_secs)
            .field("on_failure", &self.on_failure)
            .field("mute", &self.capture.is_muted())
            .field("state", &self.state)
            .field("exit_code", &self.exit_code)
            .field("pid", &self.child.as_ref().and_then(|c| c.id()))
            .finish()
    }
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(TIMEOUT_EXIT_CODE)
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(TIMEOUT_EXIT_CODE)
}

fn check_exe_path(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(RunError::invalid(format!(
            "executable path must be absolute, got {:?}",
            path
        )));
    }
    check_no_nul("executable path", &path.to_string_lossy())
}

fn check_args(args: &[String]) -> Result<()> {
    for (index, arg) in args.iter().enumerate() {
        check_no_nul(&format!("argument at position {index}"), arg)?;
    }
    Ok(())
}

fn check_search_paths(paths: &[PathBuf]) -> Result<()> {
    for (index, path) in paths.iter().enumerate() {
        if path.as_os_str().is_empty() {
            return Err(RunError::invalid(format!("search path at position {index} is empty")));
        }
        check_no_nul(&format!("search path at position {index}"), &path.to_string_lossy())?;
    }
    Ok(())
}

fn check_cwd(cwd: &Path) -> Result<()> {
    if cwd.as_os_str().is_empty() {
        return Err(RunError::invalid("working directory must not be empty"));
    }
    check_no_nul("working directory", &cwd.to_string_lossy())
}

fn check_timeout(timeout_secs: f64) -> Result<Duration> {
    if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
        return Err(RunError::invalid(format!(
            "timeout must be a positive number of seconds, got {timeout_secs}"
        )));
    }
    Duration::try_from_secs_f64(timeout_secs)
        .map_err(|e| RunError::invalid(format!("timeout out of range: {e}")))
}

fn check_no_nul(what: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(RunError::invalid(format!("{what} contains a NUL byte")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs_exe() -> PathBuf {
        std::env::temp_dir().join("tool")
    }

    #[test]
    fn new_context_is_constructed_with_no_exit_code() {
        let ctx = RunContext::new(abs_exe(), vec!["a".into()], &RunOptions::default()).unwrap();
        assert_eq!(ctx.state(), RunState::Constructed);
        assert_eq!(ctx.exit_code(), None);
        assert!(ctx.output_lines().is_empty());
        assert_eq!(ctx.exe_short_name(), "tool");
    }

    #[test]
    fn relative_exe_path_is_rejected() {
        let err = RunContext::new(PathBuf::from("tool"), vec![], &RunOptions::default()).unwrap_err();
        assert!(matches!(err, RunError::InvalidArgument(_)));
    }

    #[test]
    fn bad_timeouts_are_rejected() {
        for timeout in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let options = RunOptions::default().with_timeout_secs(timeout);
            let err = RunContext::new(abs_exe(), vec![], &options).unwrap_err();
            assert!(matches!(err, RunError::InvalidArgument(_)), "timeout {timeout}");
        }
    }

    #[test]
    fn nul_in_argument_is_rejected_with_position() {
        let err = RunContext::new(abs_exe(), vec!["ok".into(), "b\0d".into()], &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, RunError::InvalidArgument(msg) if msg.contains("position 1")));
    }

    #[test]
    fn empty_cwd_and_bad_filter_are_rejected() {
        let err = RunContext::new(abs_exe(), vec![], &RunOptions::default().with_cwd("")).unwrap_err();
        assert!(matches!(err, RunError::InvalidArgument(_)));

        let err = RunContext::new(abs_exe(), vec![], &RunOptions::default().with_filter("(")).unwrap_err();
        assert!(matches!(err, RunError::InvalidArgument(_)));
    }

    #[test]
    fn queries_before_start_are_errors() {
        let mut ctx = RunContext::new(abs_exe(), vec![], &RunOptions::default()).unwrap();
        assert!(matches!(ctx.is_timed_out(), Err(RunError::InvalidState(_))));
        assert!(matches!(ctx.poll_exit(), Err(RunError::InvalidState(_))));
        assert!(matches!(ctx.mark_completed(0), Err(RunError::InvalidState(_))));
    }

    #[test]
    fn command_display_includes_args_and_cwd() {
        let ctx = RunContext::new(abs_exe(), vec!["-v".into(), "x".into()], &RunOptions::default())
            .unwrap();
        let shown = ctx.command_display();
        assert!(shown.starts_with(&format!("\"{} -v x\" in \"", abs_exe().display())));
    }

    #[test]
    fn debug_repr_omits_output() {
        let ctx = RunContext::new(abs_exe(), vec![], &RunOptions::default()).unwrap();
        let repr = format!("{ctx:?}");
        assert!(repr.contains("RunContext"));
        assert!(repr.contains("timeout_secs"));
        assert!(!repr.contains("lines"));
    }
}
