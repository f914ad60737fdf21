// src/exec/mod.rs

//! Process execution layer.
//!
//! This module launches external commands with `tokio::process::Command` and
//! supervises them until they exit, time out, or are cancelled.
//!
//! - [`process`] holds the shared spawn / kill-and-reap primitives, used by
//!   the interactive runner as well.
//! - [`heartbeat`] is the liveness flag set by output readers.
//! - [`output`] spawns one line reader per child stream.
//! - [`batch`] provides [`BatchRunner`], the watchdog-supervised runner.

pub mod batch;
pub mod heartbeat;
pub mod output;
pub mod process;

pub use batch::BatchRunner;
pub use heartbeat::Heartbeat;
