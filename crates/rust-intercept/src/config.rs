//! Configuration types for rust-intercept.
//!
//! This module defines the configuration of a [`Manager`](crate::Manager)
//! and of test logging. Values can be built in code, read from
//! `INTERCEPT_*` environment variables ([`env`]) or loaded from TOML/JSON
//! files ([`file`]).

pub mod env;
pub mod file;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MockError;

/// Default name reported by managers in log events.
pub const DEFAULT_MANAGER_NAME: &str = "default";

/// Default tracing filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration for a manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Name reported in log events, useful with many managers per process.
    pub name: Option<String>,

    /// Reject call sites that mix handler and conditional behaviors.
    pub strict_modes: bool,

    /// Emit per-dispatch events at `debug` instead of `trace`.
    pub trace_dispatch: bool,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl ManagerConfig {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the manager name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enable or disable strict modes.
    #[must_use]
    pub const fn strict_modes(mut self, strict: bool) -> Self {
        self.strict_modes = strict;
        self
    }

    /// Enable or disable dispatch tracing at `debug` level.
    #[must_use]
    pub const fn trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Name to report, falling back to [`DEFAULT_MANAGER_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MANAGER_NAME)
    }
}

/// Configuration for test logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `"debug"` or `"rust_intercept=trace"`.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Include the target module in each line.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter directive.
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether the target module is printed.
    #[must_use]
    pub const fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,

    /// Single-line output.
    #[default]
    Compact,

    /// JSON lines.
    Json,
}

impl FromStr for LogFormat {
    type Err = MockError;

    /// Parse a format name (case-insensitive).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" | "plain" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(MockError::config(format!("unknown log format `{other}`"))),
        }
    }
}
