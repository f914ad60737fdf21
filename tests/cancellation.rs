// tests/cancellation.rs
#![cfg(unix)]

mod common;
use crate::common::{collecting_sink, init_tracing, pid_is_alive, sh, wait_for_pid_file, with_timeout};

use std::time::{Duration, Instant};

use vcsrun::cancel::CancellationToken;
use vcsrun::config::RunnerOptions;
use vcsrun::errors::VcsrunError;
use vcsrun::exec::BatchRunner;
use vcsrun::types::OutputSinks;

fn cancel_after(token: &CancellationToken, delay: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
}

#[tokio::test]
async fn cancelling_a_waiting_run_kills_the_child() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let token = CancellationToken::new();
    let runner = BatchRunner::new(RunnerOptions::quiet(), token.clone());

    let inv = sh(&format!("echo $$ > '{}'; exec sleep 30", pid_file.display()));
    let run = tokio::spawn(async move { runner.run_silent(&inv).await });

    let pid = wait_for_pid_file(&pid_file).await;
    assert!(pid_is_alive(pid));

    let started = Instant::now();
    token.cancel();
    let result = with_timeout(run).await.unwrap();

    assert!(matches!(result, Err(VcsrunError::Cancelled)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!pid_is_alive(pid), "child {pid} still alive after Cancelled");
}

#[tokio::test]
async fn cancellation_wins_over_a_pending_watchdog() {
    init_tracing();

    let token = CancellationToken::new();
    let runner = BatchRunner::new(RunnerOptions::quiet(), token.clone());
    let inv = sh("exec sleep 30").with_watchdog(Duration::from_secs(10));

    cancel_after(&token, Duration::from_millis(200));
    let result = with_timeout(runner.run_silent(&inv)).await;

    assert!(result.as_ref().is_err_and(|e| e.is_cancelled()), "{result:?}");
}

#[tokio::test]
async fn already_cancelled_token_never_starts_the_child() {
    init_tracing();

    let token = CancellationToken::new();
    token.cancel();
    let runner = BatchRunner::new(RunnerOptions::quiet(), token);

    let (sink, lines) = collecting_sink();
    let sinks = OutputSinks {
        stdout: Some(sink),
        stderr: None,
    };

    let result = with_timeout(runner.run(&sh("echo started"), sinks)).await;

    assert!(matches!(result, Err(VcsrunError::Cancelled)));
    assert!(lines.lock().unwrap().is_empty());
}

#[tokio::test]
async fn one_token_cancels_every_concurrent_run() {
    init_tracing();

    let token = CancellationToken::new();
    let mut handles = Vec::new();
    for _ in 0..3 {
        let runner = BatchRunner::new(RunnerOptions::quiet(), token.clone());
        handles.push(tokio::spawn(async move {
            runner.run_silent(&sh("exec sleep 30")).await
        }));
    }

    cancel_after(&token, Duration::from_millis(200));

    for handle in handles {
        let result = with_timeout(handle).await.unwrap();
        assert!(matches!(result, Err(VcsrunError::Cancelled)), "{result:?}");
    }
}

#[tokio::test]
async fn cancellation_after_exit_does_not_change_the_result() {
    init_tracing();

    let token = CancellationToken::new();
    let runner = BatchRunner::new(RunnerOptions::quiet(), token.clone());

    let code = with_timeout(runner.run_silent(&sh("exit 7"))).await.unwrap();
    token.cancel();

    assert_eq!(code, 7);
}
