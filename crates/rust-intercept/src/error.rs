//! Error types for rust-intercept.
//!
//! Configuration mistakes made while writing a test (two handlers on one call
//! site, a predicate without a return value, a callable with no stable
//! identity) are reported through [`MockError`] and surface as panics at the
//! point of dispatch. Unboxing failures and config loading use the same type
//! so adapters and tests only ever deal with one error enum.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Format a duplicate-handler message with a hint on how to fix it.
fn format_duplicate_handler(label: &str) -> String {
    format!(
        "duplicate handler registered for {label}\n\
         \n\
         Tip: a call site accepts a single `handle` behavior. Use `when`/`returns` \
         records to vary results per argument, or `reset` the manager first."
    )
}

/// Format a mixed-mode message.
fn format_mixed_modes(label: &str) -> String {
    format!(
        "handler and conditional behaviors both registered for {label} \
         while strict modes are enabled"
    )
}

/// The main error type for rust-intercept operations.
#[derive(Debug, Error)]
pub enum MockError {
    /// More than one handler-mode behavior was registered for a call site.
    #[error("{}", format_duplicate_handler(label))]
    DuplicateHandler {
        /// Label of the call site.
        label: String,
    },

    /// Handler and conditional behaviors were mixed under strict modes.
    #[error("{}", format_mixed_modes(label))]
    MixedModes {
        /// Label of the call site.
        label: String,
    },

    /// A predicate matched but no return value producer was installed.
    #[error("behavior for {label} matched but has no return value; call `returns` after `when`")]
    MissingReturn {
        /// Label of the call site.
        label: String,
    },

    /// The mock target cannot be turned into a stable call-site identity.
    #[error("mock target must be a function item or method path: {what}")]
    NotCallable {
        /// Description of the rejected value.
        what: String,
    },

    /// Wrong number of arguments passed to a behavior.
    #[error("{label} expects {expected} argument(s), but got {got}")]
    ArgumentArity {
        /// Label of the call site.
        label: String,
        /// Arity the behavior was declared with.
        expected: usize,
        /// Arity of the argument list.
        got: usize,
    },

    /// An argument did not have the type the behavior was declared with.
    #[error("argument {index} of {label} is not a `{expected}`")]
    ArgumentType {
        /// Label of the call site.
        label: String,
        /// Zero-based argument position.
        index: usize,
        /// Name of the declared type.
        expected: &'static str,
    },

    /// Wrong number of result values to unbox.
    #[error("expected {expected} return value(s), but got {got}")]
    ResultArity {
        /// Number of values requested.
        expected: usize,
        /// Number of values available.
        got: usize,
    },

    /// A result value did not have the requested type.
    #[error("return value {index} is not a `{expected}`")]
    ResultType {
        /// Zero-based result position.
        index: usize,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// No behavior handled a call that has no real implementation.
    #[error("no mock code matched for {target}")]
    Unmatched {
        /// `Type.method` of the unmatched call.
        target: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid TOML configuration.
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid JSON configuration.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rust-intercept operations.
pub type Result<T, E = MockError> = std::result::Result<T, E>;

impl MockError {
    /// Create a duplicate handler error.
    pub fn duplicate_handler(label: impl Into<String>) -> Self {
        Self::DuplicateHandler {
            label: label.into(),
        }
    }

    /// Create a mixed modes error.
    pub fn mixed_modes(label: impl Into<String>) -> Self {
        Self::MixedModes {
            label: label.into(),
        }
    }

    /// Create a missing return error.
    pub fn missing_return(label: impl Into<String>) -> Self {
        Self::MissingReturn {
            label: label.into(),
        }
    }

    /// Create a not-callable error.
    pub fn not_callable(what: impl Into<String>) -> Self {
        Self::NotCallable { what: what.into() }
    }

    /// Create an unmatched call error.
    pub fn unmatched(target: impl Into<String>) -> Self {
        Self::Unmatched {
            target: target.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a test-authoring mistake that must fail fast.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateHandler { .. }
                | Self::MixedModes { .. }
                | Self::MissingReturn { .. }
                | Self::NotCallable { .. }
        )
    }

    /// Check if this error comes from unboxing result values.
    #[must_use]
    pub const fn is_unboxing(&self) -> bool {
        matches!(self, Self::ResultArity { .. } | Self::ResultType { .. })
    }

    /// Check if this error reports an unmatched call.
    #[must_use]
    pub const fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched { .. })
    }

    /// Get the call-site label this error refers to, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::DuplicateHandler { label }
            | Self::MixedModes { label }
            | Self::MissingReturn { label }
            | Self::ArgumentArity { label, .. }
            | Self::ArgumentType { label, .. } => Some(label),
            Self::Unmatched { target } => Some(target),
            _ => None,
        }
    }

    /// Panic with this error's message.
    ///
    /// Used at the fail-fast points of the engine so that the test sees the
    /// full diagnostic text.
    #[track_caller]
    pub fn raise(self) -> ! {
        panic!("{self}")
    }
}
