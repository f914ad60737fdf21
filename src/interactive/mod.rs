// src/interactive/mod.rs

//! Interactive sessions with a prompting version-control tool.
//!
//! - [`prompt`] is the byte-level prompt scanner (`PromptType`,
//!   `PromptScanner`).
//! - [`terminal`] defines the `PasswordSource` capability and the real
//!   terminal implementation.
//! - [`runner`] ties them to a child process with piped stdin/stderr.

pub mod prompt;
pub mod runner;
pub mod terminal;

pub use prompt::{PromptScanner, PromptType};
pub use runner::InteractiveRunner;
pub use terminal::{PasswordSource, TerminalPasswordSource};
