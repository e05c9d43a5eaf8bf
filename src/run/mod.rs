// src/run/mod.rs

//! Process-run supervisor.
//!
//! - [`options`] holds the caller-facing [`RunOptions`].
//! - [`context`] owns the state of one execution ([`RunContext`]).
//! - [`monitor`] polls a started context until it completes or times out.
//! - [`orchestrator`] is the public entry point ([`run`]) and the exit policy.

pub mod context;
pub mod monitor;
pub mod options;
pub mod orchestrator;

pub use context::{RunContext, RunState, TIMEOUT_EXIT_CODE};
pub use monitor::{POLL_INTERVAL, supervise};
pub use options::{DEFAULT_TIMEOUT_SECS, RunOptions};
pub use orchestrator::{
    ExitDecision, Execution, RunOutput, check_error, execute, parse_command, run,
    run_with_resolver, sanitize_filters,
};
