// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, DEFAULT_DRAIN_GRACE, RunnerOptions, parse_duration};
use crate::errors::{Result, VcsrunError};

/// Validate a loaded configuration and resolve it into [`RunnerOptions`].
///
/// This checks:
/// - `[runner].watchdog` parses and is non-zero
/// - `[runner].drain_grace` parses
/// - neither exceeds [`MAX_DURATION`](crate::config::model::MAX_DURATION)
/// - `[interactive].tool` is not blank
pub fn validate_config(cfg: &ConfigFile) -> Result<RunnerOptions> {
    let default_watchdog = cfg
        .runner
        .watchdog
        .as_deref()
        .map(|s| parse_field("[runner].watchdog", s))
        .transpose()?;

    if default_watchdog == Some(Duration::ZERO) {
        return Err(VcsrunError::ConfigError(
            "[runner].watchdog must be greater than zero; omit it to disable the watchdog"
                .to_string(),
        ));
    }

    let drain_grace = cfg
        .runner
        .drain_grace
        .as_deref()
        .map(|s| parse_field("[runner].drain_grace", s))
        .transpose()?
        .unwrap_or(DEFAULT_DRAIN_GRACE);

    let tool = cfg.interactive.tool.trim();
    if tool.is_empty() {
        return Err(VcsrunError::ConfigError(
            "[interactive].tool must not be empty".to_string(),
        ));
    }

    Ok(RunnerOptions {
        echo: cfg.runner.echo,
        default_watchdog,
        drain_grace,
        interactive_tool: tool.to_string(),
    })
}

fn parse_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| VcsrunError::ConfigError(format!("invalid {field} '{value}': {e}")))
}
