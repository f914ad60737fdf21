// src/logging.rs

//! Diagnostics for `vcsrun`, written to stderr so that stdout carries only
//! what the child prints.
//!
//! The filter comes from `--log-level` when given. Otherwise `VCSRUN_LOG` is
//! read as a full `EnvFilter` directive list, so `VCSRUN_LOG=vcsrun::exec=debug`
//! narrows to the runners. Anything unusable falls back to `info`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "VCSRUN_LOG";

const FALLBACK_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = resolve_filter(cli_level, env_value.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Pick the filter: an explicit CLI level wins over the environment.
fn resolve_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(cli_directive(level));
    }

    env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_DIRECTIVE))
}

fn cli_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
