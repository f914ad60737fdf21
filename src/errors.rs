// src/errors.rs

//! Crate-wide error type and `Result` alias.
//!
//! A child that exits with a failure code is *not* an error here: exit codes
//! are returned to the caller as data. The variants below are the ways a
//! `run` call itself can fail.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcsrunError {
    /// The executable could not be located or started by the OS.
    #[error("Tool not found: could not start '{tool}': {source}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The watchdog saw no output for the whole interval. The child has
    /// already been killed and reaped when this is returned.
    #[error("Timed out: no output from child process for {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The shared cancellation token fired. The child has already been
    /// killed and reaped when this is returned.
    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Invalid argument string: {0}")]
    InvalidArguments(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VcsrunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, VcsrunError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, VcsrunError::Timeout { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, VcsrunError>;
