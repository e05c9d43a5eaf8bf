// src/run/monitor.rs

//! Polling loop that waits for a started run to complete or time out.

use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{Result, RunError};
use crate::hooks::OutputSink;
use crate::run::context::RunContext;

/// Delay between two polls of the child.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How long to wait for the child's pipes to close after it exited.
pub const FLUSH_GRACE: Duration = Duration::from_millis(500);

/// Drive a started context to a terminal state.
///
/// Each iteration drains output, then checks for completion, then for the
/// timeout. Completion is checked first, so a process that exits in the same
/// cycle the budget runs out is reported as completed.
///
/// Returns the process exit code, or [`RunError::Timeout`] after the context
/// was marked timed out.
pub async fn supervise(ctx: &mut RunContext, sink: &dyn OutputSink) -> Result<i32> {
    loop {
        ctx.drain(sink);

        if let Some(code) = ctx.poll_exit()? {
            ctx.mark_completed(code)?;
            if !ctx.capture_mut().finish(sink, FLUSH_GRACE).await {
                debug!(exe = %ctx.exe_short_name(), "child pipes still open after exit");
            }
            debug!(exe = %ctx.exe_short_name(), exit_code = code, elapsed = ?ctx.elapsed(), "process finished");
            return Ok(code);
        }

        if ctx.is_timed_out()? {
            ctx.mark_timed_out()?;
            ctx.drain(sink);
            warn!(
                exe = %ctx.exe_short_name(),
                timeout_secs = ctx.timeout_secs(),
                "process timed out"
            );
            return Err(RunError::Timeout {
                exe: ctx.exe_short_name(),
                timeout_secs: ctx.timeout_secs(),
            });
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
