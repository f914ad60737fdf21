// src/interactive/terminal.rs

//! Masked password entry.
//!
//! The interactive runner only needs "read one masked line"; it talks to a
//! [`PasswordSource`] so tests can script the answers instead of needing a
//! real terminal.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::pin::Pin;

use anyhow::anyhow;
use console::{Key, Term};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::errors::{Result, VcsrunError};

/// Capability: read one line of secret input.
///
/// Implementations must return `Cancelled` promptly once `cancel` fires.
pub trait PasswordSource: Send {
    fn read_masked_line<'a>(
        &'a mut self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Reads from the controlling terminal key by key without echoing.
///
/// Backspace removes the last character and Enter ends the line. Masking
/// depends on stdin being a terminal; when stdin is redirected the password
/// is read as a plain line from it instead, since nothing is echoed then.
#[derive(Debug, Clone)]
pub struct TerminalPasswordSource {
    stdin_is_term: bool,
    /// Handle used for raw key reads and the closing newline. Either of our
    /// outputs will do as long as it is a terminal, so `2>log` still masks.
    term: Option<Term>,
}

impl TerminalPasswordSource {
    pub fn new() -> Self {
        let term = [Term::stderr(), Term::stdout()]
            .into_iter()
            .find(|t| t.is_term());
        Self {
            stdin_is_term: io::stdin().is_terminal(),
            term,
        }
    }
}

impl Default for TerminalPasswordSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordSource for TerminalPasswordSource {
    fn read_masked_line<'a>(
        &'a mut self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            if !self.stdin_is_term {
                debug!("stdin is not a terminal; reading password as a plain line");
                return read_plain_line(cancel).await;
            }

            let Some(term) = self.term.as_ref() else {
                return Err(VcsrunError::Other(anyhow!(
                    "stdin is a terminal but neither stdout nor stderr is; refusing to read a password that would be echoed"
                )));
            };

            let mut line = String::new();
            loop {
                if cancel.is_cancelled() {
                    return Err(VcsrunError::Cancelled);
                }

                let key = read_one_key(term, cancel).await?;
                if apply_key(&mut line, key)? == KeyStep::Finished {
                    break;
                }
            }

            // The keystrokes were not echoed, so finish the prompt line.
            let _ = term.write_line("");
            Ok(line)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyStep {
    Pending,
    Finished,
}

/// Fold one key read into the line being typed.
fn apply_key(line: &mut String, key: io::Result<Key>) -> Result<KeyStep> {
    match key {
        Ok(Key::Enter) => return Ok(KeyStep::Finished),
        Ok(Key::Backspace) => {
            line.pop();
        }
        // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
        Ok(Key::Char('\u{3}')) => return Err(VcsrunError::Cancelled),
        Ok(Key::Char(c)) if !c.is_control() => line.push(c),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(VcsrunError::Cancelled),
        Err(e) => return Err(e.into()),
    }
    Ok(KeyStep::Pending)
}

/// One blocking key read, raced against cancellation.
///
/// The outer `Result` is the runner-level outcome, the inner one is the
/// terminal's own.
async fn read_one_key(
    term: &Term,
    cancel: &CancellationToken,
) -> Result<io::Result<Key>> {
    let term = term.clone();
    tokio::select! {
        _ = cancel.cancelled() => Err(VcsrunError::Cancelled),
        joined = tokio::task::spawn_blocking(move || term.read_key()) => {
            Ok(joined.map_err(anyhow::Error::from)?)
        }
    }
}

async fn read_plain_line(cancel: &CancellationToken) -> Result<String> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    let read = tokio::select! {
        _ = cancel.cancelled() => return Err(VcsrunError::Cancelled),
        read = reader.read_line(&mut line) => read?,
    };
    if read == 0 {
        return Err(VcsrunError::Other(anyhow!(
            "stdin closed before a password was entered"
        )));
    }

    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(keys: Vec<io::Result<Key>>) -> Result<String> {
        let mut line = String::new();
        for key in keys {
            if apply_key(&mut line, key)? == KeyStep::Finished {
                return Ok(line);
            }
        }
        panic!("no Enter in key sequence; line so far: {line:?}");
    }

    #[test]
    fn enter_finishes_the_line() {
        let line = type_keys(vec![
            Ok(Key::Char('p')),
            Ok(Key::Char('w')),
            Ok(Key::Enter),
        ])
        .unwrap();
        assert_eq!(line, "pw");
    }

    #[test]
    fn backspace_removes_the_last_character() {
        let line = type_keys(vec![
            Ok(Key::Char('a')),
            Ok(Key::Char('b')),
            Ok(Key::Backspace),
            Ok(Key::Char('c')),
            Ok(Key::Enter),
        ])
        .unwrap();
        assert_eq!(line, "ac");
    }

    #[test]
    fn backspace_on_empty_line_is_harmless() {
        let line = type_keys(vec![Ok(Key::Backspace), Ok(Key::Char('x')), Ok(Key::Enter)]).unwrap();
        assert_eq!(line, "x");
    }

    #[test]
    fn control_and_navigation_keys_are_ignored() {
        let line = type_keys(vec![
            Ok(Key::Char('\t')),
            Ok(Key::ArrowLeft),
            Ok(Key::Char('é')),
            Ok(Key::Enter),
        ])
        .unwrap();
        assert_eq!(line, "é");
    }

    #[test]
    fn ctrl_c_key_cancels() {
        let result = type_keys(vec![Ok(Key::Char('s')), Ok(Key::Char('\u{3}'))]);
        assert!(matches!(result, Err(VcsrunError::Cancelled)), "{result:?}");
    }

    #[test]
    fn interrupted_read_cancels() {
        let result = type_keys(vec![Err(io::Error::from(io::ErrorKind::Interrupted))]);
        assert!(matches!(result, Err(VcsrunError::Cancelled)), "{result:?}");
    }

    #[test]
    fn other_read_errors_are_io_errors() {
        let result = type_keys(vec![Err(io::Error::other("tty gone"))]);
        assert!(matches!(result, Err(VcsrunError::IoError(_))), "{result:?}");
    }
}
