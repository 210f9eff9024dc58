//! Environment-based configuration.

use std::collections::HashMap;

use super::{LogFormat, ManagerConfig};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "INTERCEPT";

/// Variable names read by [`EnvConfig::manager_config`], without prefix.
pub mod vars {
    /// Manager name.
    pub const NAME: &str = "NAME";
    /// Reject mixed handler and conditional behaviors.
    pub const STRICT_MODES: &str = "STRICT_MODES";
    /// Per-dispatch events at debug level.
    pub const TRACE_DISPATCH: &str = "TRACE_DISPATCH";
    /// Tracing filter directive.
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// Log output format.
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Environment variable reader.
///
/// Values set with [`EnvConfig::set`] shadow the process environment, so
/// tests never have to mutate global state.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Overrides, keyed by full variable name.
    overrides: HashMap<String, String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            overrides: HashMap::new(),
        }
    }

    /// Create without a prefix.
    #[must_use]
    pub fn no_prefix() -> Self {
        Self::new(String::new())
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        self.overrides
            .get(&var_name)
            .cloned()
            .or_else(|| std::env::var(&var_name).ok())
    }

    /// Get a parsed value.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Get a boolean value.
    ///
    /// Returns `None` for values that are neither truthy nor falsy.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)
            .and_then(|v| match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" | "enabled" => Some(true),
                "0" | "false" | "no" | "off" | "disabled" => Some(false),
                _ => None,
            })
    }

    /// Get a boolean with default.
    #[must_use]
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.bool(name).unwrap_or(default)
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Shadow a variable.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let var_name = self.var_name(name);
        self.overrides.insert(var_name, value.into());
    }

    /// Remove a shadowed variable.
    pub fn unset(&mut self, name: &str) {
        let var_name = self.var_name(name);
        self.overrides.remove(&var_name);
    }

    /// Build a manager configuration on top of `base`.
    ///
    /// Unset or unparsable variables leave the corresponding field alone.
    #[must_use]
    pub fn apply(&self, mut base: ManagerConfig) -> ManagerConfig {
        if let Some(name) = self.get(vars::NAME).filter(|n| !n.trim().is_empty()) {
            base.name = Some(name);
        }
        base.strict_modes = self.bool_or(vars::STRICT_MODES, base.strict_modes);
        base.trace_dispatch = self.bool_or(vars::TRACE_DISPATCH, base.trace_dispatch);
        if let Some(level) = self.get(vars::LOG_LEVEL) {
            base.logging.level = level;
        }
        if let Some(format) = self.parse::<LogFormat>(vars::LOG_FORMAT) {
            base.logging.format = format;
        }
        base
    }

    /// Build a manager configuration from defaults plus the environment.
    #[must_use]
    pub fn manager_config(&self) -> ManagerConfig {
        self.apply(ManagerConfig::default())
    }
}
