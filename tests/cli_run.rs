// tests/cli_run.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;
use vcsrun::cli::CliArgs;
use vcsrun::errors::VcsrunError;

type TestResult = Result<(), Box<dyn Error>>;

fn quiet_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[runner]\necho = false").unwrap();
    file
}

#[tokio::test]
async fn run_subcommand_returns_child_exit_code() -> TestResult {
    init_tracing();

    let cfg = quiet_config();
    let args = CliArgs::try_parse_from([
        "vcsrun",
        "--config",
        cfg.path().to_str().unwrap(),
        "run",
        "sh",
        "--",
        "-c 'echo hi; exit 3'",
    ])?;

    let code = with_timeout(vcsrun::run(args)).await?;
    assert_eq!(code, 3);
    Ok(())
}

#[tokio::test]
async fn capture_flag_still_returns_exit_code() -> TestResult {
    init_tracing();

    let cfg = quiet_config();
    let args = CliArgs::try_parse_from([
        "vcsrun",
        "--config",
        cfg.path().to_str().unwrap(),
        "run",
        "echo",
        "hello",
        "--capture",
    ])?;

    let code = with_timeout(vcsrun::run(args)).await?;
    assert_eq!(code, 0);
    Ok(())
}

#[tokio::test]
async fn watchdog_flag_surfaces_timeout_error() -> TestResult {
    init_tracing();

    let cfg = quiet_config();
    let args = CliArgs::try_parse_from([
        "vcsrun",
        "--config",
        cfg.path().to_str().unwrap(),
        "run",
        "sleep",
        "10",
        "--watchdog",
        "300ms",
    ])?;

    let err = with_timeout(vcsrun::run(args)).await.unwrap_err();
    assert!(
        matches!(err.downcast_ref::<VcsrunError>(), Some(VcsrunError::Timeout { .. })),
        "{err:?}"
    );
    Ok(())
}

#[tokio::test]
async fn interactive_subcommand_reads_password_from_env() -> TestResult {
    init_tracing();

    let mut cfg = NamedTempFile::new()?;
    writeln!(cfg, "[runner]\necho = false\n\n[interactive]\ntool = \"sh\"")?;

    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("VCSRUN_TEST_CLI_PASSWORD", "from-env") };

    let args = CliArgs::try_parse_from([
        "vcsrun",
        "--config",
        cfg.path().to_str().unwrap(),
        "interactive",
        "--password-env",
        "VCSRUN_TEST_CLI_PASSWORD",
        "--",
        "-c 'printf \"Password for x: \" >&2; read p; [ \"$p\" = from-env ]'",
    ])?;

    let code = with_timeout(vcsrun::run(args)).await?;
    assert_eq!(code, 0);
    Ok(())
}
