// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Default drain grace period after a batch child exits.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Upper bound for any configured duration.
pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Executable driven by the interactive runner unless configured otherwise.
pub const DEFAULT_INTERACTIVE_TOOL: &str = "svn";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [runner]
/// echo = true
/// watchdog = "30m"
/// drain_grace = "2s"
///
/// [interactive]
/// tool = "svn"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub interactive: InteractiveSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Echo child output to our own stdout/stderr while it runs.
    #[serde(default = "default_echo")]
    pub echo: bool,

    /// Default watchdog (e.g. `"30m"`) used when a call does not give one.
    /// Absent means never time out.
    #[serde(default)]
    pub watchdog: Option<String>,

    /// How long to wait for output readers to drain after the child exits.
    #[serde(default)]
    pub drain_grace: Option<String>,
}

fn default_echo() -> bool {
    true
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            echo: default_echo(),
            watchdog: None,
            drain_grace: None,
        }
    }
}

/// `[interactive]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveSection {
    /// Executable that may prompt for credentials or certificate trust.
    #[serde(default = "default_tool")]
    pub tool: String,
}

fn default_tool() -> String {
    DEFAULT_INTERACTIVE_TOOL.to_string()
}

impl Default for InteractiveSection {
    fn default() -> Self {
        Self { tool: default_tool() }
    }
}

/// Validated, typed options handed to the runners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    pub echo: bool,
    pub default_watchdog: Option<Duration>,
    pub drain_grace: Duration,
    pub interactive_tool: String,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            echo: true,
            default_watchdog: None,
            drain_grace: DEFAULT_DRAIN_GRACE,
            interactive_tool: DEFAULT_INTERACTIVE_TOOL.to_string(),
        }
    }
}

impl RunnerOptions {
    /// Options with console echo switched off; handy for embedding and tests.
    pub fn quiet() -> Self {
        Self {
            echo: false,
            ..Self::default()
        }
    }

    pub fn with_interactive_tool(mut self, tool: impl Into<String>) -> Self {
        self.interactive_tool = tool.into();
        self
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
///
/// Values above [`MAX_DURATION`] are rejected.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let too_long = || format!("duration '{}' exceeds the maximum of {:?}", s, MAX_DURATION);
    let duration = match unit.as_str() {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(too_long)?),
        "h" => Duration::from_secs(value.checked_mul(60 * 60).ok_or_else(too_long)?),
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    if duration > MAX_DURATION {
        return Err(too_long());
    }
    Ok(duration)
}
