// tests/monitor.rs

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use procrun::run::{RunContext, RunState, TIMEOUT_EXIT_CODE, supervise};
use procrun::{ExecutableResolver, RunError, RunOptions};
use procrun_test_utils::{RecordingSink, init_tracing, with_timeout};

fn system_exe(name: &str) -> PathBuf {
    const NO_ROOTS: &[&str] = &[];
    ExecutableResolver::global()
        .resolve(name, NO_ROOTS)
        .unwrap_or_else(|| panic!("{name} not found on PATH"))
}

#[tokio::test]
async fn completion_wins_over_an_expired_timeout() {
    init_tracing();
    let sink = RecordingSink::new();
    let options = RunOptions::default().with_timeout_secs(0.05);
    let mut ctx = RunContext::new(system_exe("true"), vec![], &options).unwrap();

    ctx.start().unwrap();
    // Let the process exit and the budget run out before the first poll.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(ctx.is_timed_out().unwrap());

    let code = with_timeout(supervise(&mut ctx, &sink)).await.unwrap();

    assert_eq!(code, 0);
    assert_eq!(ctx.state(), RunState::Completed);
    assert_eq!(ctx.exit_code(), Some(0));
}

#[tokio::test]
async fn timeout_marks_context_and_fails() {
    init_tracing();
    let sink = RecordingSink::new();
    let options = RunOptions::default().with_timeout_secs(0.1);
    let mut ctx = RunContext::new(system_exe("sleep"), vec!["5".into()], &options).unwrap();

    ctx.start().unwrap();
    let err = with_timeout(supervise(&mut ctx, &sink)).await.unwrap_err();

    assert!(matches!(err, RunError::Timeout { ref exe, .. } if exe == "sleep"));
    assert_eq!(ctx.state(), RunState::TimedOut);
    assert_eq!(ctx.exit_code(), Some(TIMEOUT_EXIT_CODE));
}

#[tokio::test]
async fn exit_code_is_unset_until_completion() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = RunContext::new(
        system_exe("sh"),
        vec!["-c".into(), "echo done; exit 7".into()],
        &RunOptions::default(),
    )
    .unwrap();

    ctx.start().unwrap();
    assert_eq!(ctx.state(), RunState::Started);
    assert_eq!(ctx.exit_code(), None);

    let code = with_timeout(supervise(&mut ctx, &sink)).await.unwrap();

    assert_eq!(code, 7);
    assert_eq!(ctx.exit_code(), Some(7));
    assert_eq!(ctx.output(), "done");
}

#[tokio::test]
async fn a_context_never_starts_twice() {
    init_tracing();
    let sink = RecordingSink::new();
    let mut ctx = RunContext::new(system_exe("true"), vec![], &RunOptions::default()).unwrap();

    ctx.start().unwrap();
    assert!(matches!(ctx.start(), Err(RunError::InvalidState(_))));

    with_timeout(supervise(&mut ctx, &sink)).await.unwrap();
    assert!(matches!(ctx.start(), Err(RunError::InvalidState(_))));
}

#[tokio::test]
async fn missing_working_directory_fails_to_spawn() {
    init_tracing();
    let options = RunOptions::default().with_cwd("/definitely/not/a/dir");
    let mut ctx = RunContext::new(system_exe("true"), vec![], &options).unwrap();

    let err = ctx.start().unwrap_err();

    assert!(matches!(err, RunError::Spawn { ref exe, .. } if exe == "true"));
    assert_eq!(ctx.state(), RunState::Constructed);
}
