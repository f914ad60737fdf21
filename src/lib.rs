// src/lib.rs

pub mod cancel;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod interactive;
pub mod logging;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::cli::{CliArgs, Command};
use crate::config::{RunnerOptions, load_or_default};
use crate::exec::BatchRunner;
use crate::interactive::InteractiveRunner;
use crate::types::Invocation;

pub use crate::errors::VcsrunError;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - Ctrl-C handling (triggers the shared cancellation token)
/// - the batch or interactive runner
///
/// Returns the child's exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let options = load_or_default(args.config.as_deref())?;
    debug!(?options, "resolved runner options");

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match args.command {
        Command::Run {
            command,
            arguments,
            cwd,
            watchdog,
            capture,
        } => {
            let mut invocation = Invocation::new(command, arguments).with_optional_watchdog(watchdog);
            if let Some(dir) = cwd {
                invocation = invocation.with_working_dir(dir);
            }
            run_batch(options, cancel, &invocation, capture).await
        }
        Command::Interactive {
            arguments,
            password_env,
        } => {
            let password = match password_env {
                Some(var) => Some(
                    std::env::var(&var)
                        .with_context(|| format!("reading password from ${var}"))?,
                ),
                None => None,
            };
            let mut runner = InteractiveRunner::new(options, cancel);
            let code = runner
                .run_interactive(&arguments, password.as_deref())
                .await?;
            Ok(code)
        }
    }
}

async fn run_batch(
    options: RunnerOptions,
    cancel: CancellationToken,
    invocation: &Invocation,
    capture: bool,
) -> Result<i32> {
    let runner = BatchRunner::new(options, cancel);

    if !capture {
        return Ok(runner.run_silent(invocation).await?);
    }

    let captured = runner.capture(invocation).await?;
    eprintln!(
        "vcsrun: '{}' exited with {} ({} stdout lines, {} stderr lines captured)",
        invocation,
        captured.exit_code,
        captured.stdout.lines().count(),
        captured.stderr.lines().count(),
    );
    Ok(captured.exit_code)
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; cancelling");
        cancel.cancel();
    });
}
