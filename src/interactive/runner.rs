// src/interactive/runner.rs

//! Interactive runner: answer credential and certificate prompts.

use anyhow::anyhow;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::RunnerOptions;
use crate::errors::{Result, VcsrunError};
use crate::exec::process::{
    StdioLayout, build_command, exit_code, kill_and_reap, report_abnormal_exit, spawn,
};
use crate::interactive::prompt::{PromptScanner, PromptType, read_next_prompt};
use crate::interactive::terminal::{PasswordSource, TerminalPasswordSource};
use crate::types::split_arguments;

/// Drives the configured version-control tool through its prompts.
///
/// There is no watchdog here: a session may legitimately sit waiting for a
/// human. Cancellation is the only way out of a stuck session.
pub struct InteractiveRunner<P: PasswordSource = TerminalPasswordSource> {
    options: RunnerOptions,
    cancel: CancellationToken,
    passwords: P,
}

impl InteractiveRunner<TerminalPasswordSource> {
    pub fn new(options: RunnerOptions, cancel: CancellationToken) -> Self {
        Self::with_password_source(options, cancel, TerminalPasswordSource::new())
    }
}

impl<P: PasswordSource> InteractiveRunner<P> {
    pub fn with_password_source(
        options: RunnerOptions,
        cancel: CancellationToken,
        passwords: P,
    ) -> Self {
        Self {
            options,
            cancel,
            passwords,
        }
    }

    /// The executable every call runs.
    pub fn tool(&self) -> &str {
        &self.options.interactive_tool
    }

    pub fn password_source(&self) -> &P {
        &self.passwords
    }

    /// Run the tool with `arguments`, answering prompts until it exits.
    ///
    /// - `Password for` gets `password`, or a masked line read from the
    ///   password source when `password` is `None`.
    /// - Certificate prompts are always accepted: permanently when offered,
    ///   otherwise temporarily.
    ///
    /// Returns the exit code. On `Cancelled` (or any other failure) the
    /// child is killed and reaped before returning.
    pub async fn run_interactive(
        &mut self,
        arguments: &str,
        password: Option<&str>,
    ) -> Result<i32> {
        let argv = split_arguments(arguments)?;
        if self.cancel.is_cancelled() {
            return Err(VcsrunError::Cancelled);
        }

        let tool = self.options.interactive_tool.clone();
        let label = format!("{} {}", tool, arguments.trim());

        let mut cmd = build_command(&tool, &argv, None, StdioLayout::Interactive);
        let mut child = spawn(&mut cmd, &tool)?;
        info!(command = %label, "running interactive command");

        match self.converse(&mut child, password).await {
            Ok(code) => {
                info!(command = %label, exit_code = code, "interactive command exited");
                Ok(code)
            }
            Err(err) => {
                kill_and_reap(&mut child, &tool).await;
                report_abnormal_exit(&label, &err);
                Err(err)
            }
        }
    }

    async fn converse(&mut self, child: &mut Child, password: Option<&str>) -> Result<i32> {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("child stdin was not piped"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("child stderr was not piped"))?;

        let mut scanner = PromptScanner::new();
        let echo = self.options.echo;
        let mut answered = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                return Err(VcsrunError::Cancelled);
            }

            // A raw read cannot be interrupted on its own; racing it against
            // the token lets the caller kill the child, which ends the read.
            // Racing it against exit covers a grandchild that keeps stderr
            // open after the tool itself is gone.
            let prompt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(VcsrunError::Cancelled),
                prompt = read_next_prompt(&mut stderr, &mut scanner, echo) => prompt?,
                status = child.wait() => {
                    let status = status?;
                    self.drain_after_exit(&mut stderr, &mut scanner).await;
                    debug!(answered, "interactive session finished");
                    return Ok(exit_code(status));
                }
            };

            let answer = match prompt {
                PromptType::None => break,
                PromptType::RequestPassword => match password {
                    Some(p) => p.to_string(),
                    None => self.passwords.read_masked_line(&self.cancel).await?,
                },
                PromptType::RequestCertificateFullOptions
                | PromptType::RequestCertificateNoPermanentOption => {
                    let fixed = prompt.fixed_answer().unwrap_or_default();
                    info!(?prompt, answer = fixed, "accepting server certificate");
                    fixed.to_string()
                }
            };

            answered += 1;
            debug!(?prompt, answered, "answering prompt");
            if let Err(e) = write_answer(&mut stdin, &answer).await {
                // The child is gone or stopped reading; the next scan sees EOF.
                warn!(?prompt, error = %e, "failed to write answer to child");
            }
        }

        // Nothing more to answer; close stdin so a child still reading it
        // sees EOF instead of waiting on us.
        drop(stdin);

        let status = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(VcsrunError::Cancelled),
            status = child.wait() => status?,
        };

        debug!(answered, "interactive session finished");
        Ok(exit_code(status))
    }

    /// The tool has exited: pass on whatever it left in stderr, for at most
    /// the drain grace. Prompts seen now have nobody left to answer them.
    async fn drain_after_exit(&self, stderr: &mut ChildStderr, scanner: &mut PromptScanner) {
        let grace = self.options.drain_grace;
        let echo = self.options.echo;

        let drain = async {
            loop {
                match read_next_prompt(stderr, scanner, echo).await {
                    Ok(PromptType::None) => break,
                    Ok(prompt) => debug!(?prompt, "prompt after tool exit; not answered"),
                    Err(e) => {
                        debug!(error = %e, "stderr read failed after tool exit");
                        break;
                    }
                }
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {}
            drained = tokio::time::timeout(grace, drain) => {
                if drained.is_err() {
                    warn!(
                        tool = %self.options.interactive_tool,
                        ?grace,
                        "stderr still open after tool exited; abandoning it"
                    );
                }
            }
        }
    }
}

async fn write_answer(stdin: &mut ChildStdin, answer: &str) -> std::io::Result<()> {
    stdin.write_all(answer.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}
