// src/exec/output.rs

//! Line readers for a batch child's stdout and stderr.

use std::fmt;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::exec::heartbeat::Heartbeat;
use crate::types::LineSink;

/// Which child stream a reader is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Spawn a task that reads `stream` line by line until EOF.
///
/// Per line, in order: echo to our own console stream (if `echo`), call
/// `sink` (if any), then beat the heartbeat. Lines are decoded lossily so
/// invalid UTF-8 never stops the reader, which would otherwise let the pipe
/// fill up and stall the child.
pub fn spawn_line_reader<R>(
    stream: R,
    kind: StreamKind,
    sink: Option<LineSink>,
    heartbeat: Heartbeat,
    echo: bool,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        let mut count: u64 = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(trim_line_end(&buf));
                    count += 1;

                    if echo {
                        echo_line(kind, &line);
                    }
                    if let Some(sink) = &sink {
                        sink(&line);
                    }
                    heartbeat.beat();
                }
                Err(e) => {
                    warn!(stream = %kind, error = %e, "error reading child output; stopping reader");
                    break;
                }
            }
        }

        debug!(stream = %kind, lines = count, "output reader reached end of stream");
    })
}

fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

fn echo_line(kind: StreamKind, line: &str) {
    // A closed console is not a reason to stop draining the child.
    let _ = match kind {
        StreamKind::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
        StreamKind::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
    };
}
