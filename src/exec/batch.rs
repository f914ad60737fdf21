// src/exec/batch.rs

//! Batch runner: stream output to sinks, kill children that go silent.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::RunnerOptions;
use crate::errors::{Result, VcsrunError};
use crate::exec::heartbeat::Heartbeat;
use crate::exec::output::{StreamKind, spawn_line_reader};
use crate::exec::process::{
    StdioLayout, build_command, exit_code, kill_and_reap, report_abnormal_exit, spawn,
};
use crate::types::{CapturedOutput, Invocation, LineBuffer, OutputSinks};

/// Runs external commands to completion while watching for silence.
///
/// Each call owns its child exclusively; the only thing shared between
/// concurrent calls is the read-only cancellation token.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    options: RunnerOptions,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(options: RunnerOptions, cancel: CancellationToken) -> Self {
        Self { options, cancel }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Run `invocation`, delivering each output line to the matching sink,
    /// and return the child's exit code.
    ///
    /// The watchdog is the invocation's own, else the configured default,
    /// else unbounded. A non-zero exit code is returned, not raised.
    ///
    /// Errors:
    /// - `ToolNotFound` if the executable cannot be started.
    /// - `Timeout` if no output arrived for a whole watchdog interval.
    /// - `Cancelled` if the token fired while the child was running.
    ///
    /// In both of the latter cases the child is killed and reaped first.
    pub async fn run(&self, invocation: &Invocation, sinks: OutputSinks) -> Result<i32> {
        let argv = invocation.argv()?;
        if self.cancel.is_cancelled() {
            debug!(command = %invocation, "cancelled before start; not spawning");
            return Err(VcsrunError::Cancelled);
        }

        let watchdog = invocation.watchdog.or(self.options.default_watchdog);
        let program = invocation.command.as_str();

        let mut cmd = build_command(
            program,
            &argv,
            invocation.working_dir.as_deref(),
            StdioLayout::Batch,
        );
        let mut child = spawn(&mut cmd, program)?;

        info!(command = %invocation, ?watchdog, "running batch command");

        let heartbeat = Heartbeat::new();
        let echo = self.options.echo;
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(
                stdout,
                StreamKind::Stdout,
                sinks.stdout,
                heartbeat.clone(),
                echo,
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(
                stderr,
                StreamKind::Stderr,
                sinks.stderr,
                heartbeat.clone(),
                echo,
            ));
        }

        match self.supervise(&mut child, watchdog, &heartbeat).await {
            Ok(status) => {
                self.drain(readers, program).await;
                let code = exit_code(status);
                info!(command = %invocation, exit_code = code, "batch command exited");
                Ok(code)
            }
            Err(err) => {
                kill_and_reap(&mut child, program).await;
                for reader in readers {
                    reader.abort();
                }
                report_abnormal_exit(invocation, &err);
                Err(err)
            }
        }
    }

    /// [`run`](Self::run) without sinks: output is only echoed.
    pub async fn run_silent(&self, invocation: &Invocation) -> Result<i32> {
        self.run(invocation, OutputSinks::none()).await
    }

    /// [`run`](Self::run), collecting stdout and stderr into strings.
    pub async fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput> {
        let stdout = LineBuffer::new();
        let stderr = LineBuffer::new();
        let sinks = OutputSinks {
            stdout: Some(stdout.sink()),
            stderr: Some(stderr.sink()),
        };

        let exit_code = self.run(invocation, sinks).await?;

        Ok(CapturedOutput {
            exit_code,
            stdout: stdout.contents(),
            stderr: stderr.contents(),
        })
    }

    /// Watchdog loop. Returns once the child has exited, or with the error
    /// that should end the call; killing is left to the caller.
    async fn supervise(
        &self,
        child: &mut Child,
        watchdog: Option<Duration>,
        heartbeat: &Heartbeat,
    ) -> Result<ExitStatus> {
        let mut last_activity = Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    return Err(VcsrunError::Cancelled);
                }

                status = child.wait() => {
                    return Ok(status?);
                }

                alive = heartbeat.wait(watchdog) => {
                    if !alive {
                        return Err(VcsrunError::Timeout {
                            elapsed: last_activity.elapsed(),
                        });
                    }
                    last_activity = Instant::now();
                }
            }
        }
    }

    /// Give the readers a bounded time to flush what the child wrote before
    /// it exited.
    async fn drain(&self, readers: Vec<JoinHandle<()>>, program: &str) {
        let grace = self.options.drain_grace;
        let started = Instant::now();

        for mut reader in readers {
            let remaining = grace.saturating_sub(started.elapsed());
            match tokio::time::timeout(remaining, &mut reader).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(tool = %program, error = %e, "output reader task failed");
                }
                Err(_) => {
                    // Usually a grandchild that inherited the pipe.
                    warn!(
                        tool = %program,
                        grace = ?self.options.drain_grace,
                        "output still open after child exited; abandoning reader"
                    );
                    reader.abort();
                }
            }
        }
    }
}
