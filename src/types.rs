// src/types.rs

//! Plain data passed into and out of the runners.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::{Result, VcsrunError};

/// One external command to run.
///
/// Built by the caller per call and never mutated by the runners. The
/// argument string uses POSIX shell-word rules (`'quoted words'` stay
/// together); no shell is involved in launching the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub arguments: String,
    pub working_dir: Option<PathBuf>,
    /// Maximum allowed silence before the child is presumed hung.
    /// `None` means never time out.
    pub watchdog: Option<Duration>,
}

impl Invocation {
    pub fn new(command: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: arguments.into(),
            working_dir: None,
            watchdog: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_watchdog(mut self, watchdog: Duration) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// Same as [`with_watchdog`](Self::with_watchdog), but keeps the
    /// current value when `None` is given.
    pub fn with_optional_watchdog(mut self, watchdog: Option<Duration>) -> Self {
        if watchdog.is_some() {
            self.watchdog = watchdog;
        }
        self
    }

    /// Split the argument string into argv entries.
    pub fn argv(&self) -> Result<Vec<String>> {
        split_arguments(&self.arguments)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.trim().is_empty() {
            write!(f, "{}", self.command)
        } else {
            write!(f, "{} {}", self.command, self.arguments.trim())
        }
    }
}

/// Split an argument string with shell-word rules.
pub fn split_arguments(arguments: &str) -> Result<Vec<String>> {
    shlex::split(arguments).ok_or_else(|| VcsrunError::InvalidArguments(arguments.to_string()))
}

/// Callback invoked once per line of child output, without the line
/// terminator.
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional per-stream sinks for a batch run.
///
/// A missing sink means the line is only echoed to the console.
#[derive(Clone, Default)]
pub struct OutputSinks {
    pub stdout: Option<LineSink>,
    pub stderr: Option<LineSink>,
}

impl OutputSinks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_stdout(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.stdout = Some(Arc::new(sink));
        self
    }

    pub fn with_stderr(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.stderr = Some(Arc::new(sink));
        self
    }
}

impl fmt::Debug for OutputSinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSinks")
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

/// Thread-safe line buffer, usable as a [`LineSink`].
///
/// Each appended line is terminated with `\n` in the collected text.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    inner: Arc<Mutex<String>>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, line: &str) {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        guard.push_str(line);
        guard.push('\n');
    }

    pub fn sink(&self) -> LineSink {
        let buffer = self.clone();
        Arc::new(move |line: &str| buffer.push_line(line))
    }

    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

/// Result of the capturing form of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_respects_quotes() {
        let inv = Invocation::new("git", "commit -m 'initial import' --quiet");
        assert_eq!(
            inv.argv().unwrap(),
            vec!["commit", "-m", "initial import", "--quiet"]
        );
    }

    #[test]
    fn empty_argument_string_gives_empty_argv() {
        let inv = Invocation::new("svn", "   ");
        assert!(inv.argv().unwrap().is_empty());
    }

    #[test]
    fn unbalanced_quote_is_rejected() {
        let inv = Invocation::new("git", "log --format='%H");
        match inv.argv() {
            Err(VcsrunError::InvalidArguments(s)) => assert!(s.contains("%H")),
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn optional_watchdog_keeps_existing_value_on_none() {
        let inv = Invocation::new("git", "gc")
            .with_watchdog(Duration::from_secs(5))
            .with_optional_watchdog(None);
        assert_eq!(inv.watchdog, Some(Duration::from_secs(5)));
    }

    #[test]
    fn line_buffer_terminates_each_line() {
        let buf = LineBuffer::new();
        let sink = buf.sink();
        sink("one");
        sink("two");
        assert_eq!(buf.contents(), "one\ntwo\n");
    }

    #[test]
    fn display_includes_trimmed_arguments() {
        assert_eq!(Invocation::new("git", " status ").to_string(), "git status");
        assert_eq!(Invocation::new("git", "").to_string(), "git");
    }
}
