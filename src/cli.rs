// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `vcsrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vcsrun",
    version,
    about = "Run git/svn commands with a silence watchdog, cancellation and prompt answering.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Vcsrun.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VCSRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a command, streaming its output, killing it if it goes silent.
    Run {
        /// Executable to run (looked up on PATH).
        command: String,

        /// Argument string, split with shell-word rules.
        #[arg(default_value = "", allow_hyphen_values = true)]
        arguments: String,

        /// Working directory for the child.
        #[arg(long, value_name = "DIR")]
        cwd: Option<PathBuf>,

        /// Maximum silence before the child is killed (e.g. `90s`, `30m`).
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        watchdog: Option<Duration>,

        /// Collect output in memory and print a summary at the end.
        #[arg(long)]
        capture: bool,
    },

    /// Run the configured tool, answering password and certificate prompts.
    Interactive {
        /// Argument string for the tool, split with shell-word rules.
        #[arg(default_value = "", allow_hyphen_values = true)]
        arguments: String,

        /// Environment variable holding the password. Prompts on the
        /// terminal when unset.
        #[arg(long, value_name = "VAR")]
        password_env: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
