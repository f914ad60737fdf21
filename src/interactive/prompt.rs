// src/interactive/prompt.rs

//! Byte-level prompt detection on a child's error stream.
//!
//! Credential and certificate prompts do not end with a newline, so the
//! stream is consumed one byte at a time and the decoded text is checked
//! after every byte.

use std::io::Write;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::errors::Result;

pub const PASSWORD_PROMPT: &str = "Password for";
pub const CERTIFICATE_FULL_PROMPT: &str =
    "(R)eject, accept (t)emporarily or accept (p)ermanently?";
pub const CERTIFICATE_TEMPORARY_PROMPT: &str = "(R)eject or accept (t)emporarily?";

/// Accumulated text is trimmed back to this many bytes once it grows past
/// [`MAX_BUFFERED`]. Comfortably longer than any prompt.
const KEEP_TAIL: usize = 256;
const MAX_BUFFERED: usize = 8 * 1024;

/// What the child is currently asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptType {
    None,
    RequestPassword,
    /// Reject / accept temporarily / accept permanently.
    RequestCertificateFullOptions,
    /// Reject / accept temporarily.
    RequestCertificateNoPermanentOption,
}

impl PromptType {
    /// The fixed answer for certificate prompts; passwords have none.
    pub fn fixed_answer(self) -> Option<&'static str> {
        match self {
            PromptType::RequestCertificateFullOptions => Some("p"),
            PromptType::RequestCertificateNoPermanentOption => Some("t"),
            PromptType::None | PromptType::RequestPassword => None,
        }
    }

    fn detect_suffix(text: &str) -> PromptType {
        if text.ends_with(PASSWORD_PROMPT) {
            PromptType::RequestPassword
        } else if text.ends_with(CERTIFICATE_FULL_PROMPT) {
            PromptType::RequestCertificateFullOptions
        } else if text.ends_with(CERTIFICATE_TEMPORARY_PROMPT) {
            PromptType::RequestCertificateNoPermanentOption
        } else {
            PromptType::None
        }
    }
}

/// Incremental decoder + matcher.
///
/// Feed it bytes with [`push`](Self::push); it reports a prompt the moment
/// one of the known phrases is completed and then starts over with empty
/// text. Split UTF-8 sequences are held back until complete; invalid ones
/// become U+FFFD.
#[derive(Debug, Default)]
pub struct PromptScanner {
    text: String,
    pending: Vec<u8>,
}

impl PromptScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text decoded since the last detection (possibly trimmed at the front).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn push(&mut self, byte: u8) -> PromptType {
        self.pending.push(byte);

        match std::str::from_utf8(&self.pending) {
            Ok(s) => self.text.push_str(s),
            // Incomplete sequence: wait for more bytes.
            Err(e) if e.error_len().is_none() => return PromptType::None,
            Err(_) => self.text.push_str(&String::from_utf8_lossy(&self.pending)),
        }
        self.pending.clear();

        let prompt = PromptType::detect_suffix(&self.text);
        if prompt != PromptType::None {
            self.text.clear();
        } else if self.text.len() > MAX_BUFFERED {
            self.trim_front();
        }
        prompt
    }

    fn trim_front(&mut self) {
        let mut cut = self.text.len() - KEEP_TAIL;
        while !self.text.is_char_boundary(cut) {
            cut += 1;
        }
        self.text.drain(..cut);
    }
}

/// Read `stream` byte by byte until a prompt is detected or the stream ends.
///
/// Returns `PromptType::None` at end of stream. With `echo`, every consumed
/// byte is copied to our own stderr as it arrives.
pub async fn read_next_prompt<R>(
    stream: &mut R,
    scanner: &mut PromptScanner,
    echo: bool,
) -> Result<PromptType>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];

    loop {
        if stream.read(&mut byte).await? == 0 {
            return Ok(PromptType::None);
        }

        if echo {
            let mut err = std::io::stderr().lock();
            let _ = err.write_all(&byte);
            let _ = err.flush();
        }

        let prompt = scanner.push(byte[0]);
        if prompt != PromptType::None {
            return Ok(prompt);
        }
    }
}
