// src/exec/process.rs

//! Child-process primitives shared by both runners.

use std::fmt::Display;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::{Result, VcsrunError};

/// How the three standard streams of a child are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioLayout {
    /// stdin closed, stdout and stderr piped for line reading.
    Batch,
    /// stdin and stderr piped, stdout inherited from us.
    Interactive,
}

/// Build a command for `program` with already-split arguments.
///
/// The child is always `kill_on_drop`, so a dropped handle can never leave
/// an orphan behind even on a panic path.
pub fn build_command(
    program: &str,
    argv: &[String],
    working_dir: Option<&Path>,
    layout: StdioLayout,
) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(argv).kill_on_drop(true);

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    match layout {
        StdioLayout::Batch => {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }
        StdioLayout::Interactive => {
            cmd.stdin(Stdio::piped())
                .stdout(Stdio::inherit())
                .stderr(Stdio::piped());
        }
    }

    cmd
}

/// Spawn `cmd`, mapping any OS-level start failure to `ToolNotFound`.
pub fn spawn(cmd: &mut Command, program: &str) -> Result<Child> {
    match cmd.spawn() {
        Ok(child) => {
            info!(tool = %program, pid = ?child.id(), "started child process");
            Ok(child)
        }
        Err(source) => {
            warn!(tool = %program, error = %source, "failed to start child process");
            Err(VcsrunError::ToolNotFound {
                tool: program.to_string(),
                source,
            })
        }
    }
}

/// Kill the child if it is still alive, then wait for it so the OS can
/// release it.
///
/// Never fails: problems are logged, since this runs on paths that are
/// already reporting some other outcome.
pub async fn kill_and_reap(child: &mut Child, program: &str) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(tool = %program, ?status, "child already exited; nothing to kill");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            warn!(tool = %program, error = %e, "failed to query child status before kill");
        }
    }

    let pid = child.id();
    if let Err(e) = child.kill().await {
        warn!(tool = %program, ?pid, error = %e, "failed to kill child process");
        // Still try to reap whatever is left.
        if let Err(e) = child.wait().await {
            warn!(tool = %program, ?pid, error = %e, "failed to reap child process");
        }
    } else {
        debug!(tool = %program, ?pid, "child process killed and reaped");
    }
}

/// Exit code of a terminated child; `-1` when it was ended by a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Tell the user why a run ended early. Called after the child is gone.
pub fn report_abnormal_exit(what: &dyn Display, err: &VcsrunError) {
    match err {
        VcsrunError::Timeout { elapsed } => {
            warn!(command = %what, ?elapsed, "watchdog expired; child killed");
            eprintln!(
                "vcsrun: '{what}' produced no output for {elapsed:.1?} and was presumed hung; process killed"
            );
        }
        VcsrunError::Cancelled => {
            warn!(command = %what, "cancellation requested; child killed");
            eprintln!("vcsrun: '{what}' was cancelled; process killed");
        }
        other => {
            warn!(command = %what, error = %other, "run failed; child killed");
        }
    }
}
