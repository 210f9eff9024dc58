//! Tracing subscriber setup for tests that want to see dispatch events.
//!
//! The engine only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. [`init`] installs one globally from a
//! [`LoggingConfig`], [`init_for_tests`] does the same with the libtest
//! capture writer and never fails.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, TestWriter, writer::BoxMakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::env::EnvConfig;
use crate::config::{LogFormat, LoggingConfig};
use crate::error::{MockError, Result};

/// A type-erased subscriber.
pub type BoxSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Build a subscriber for `config` without installing it.
///
/// Useful with `tracing::subscriber::with_default` for scoped capture.
pub fn subscriber(config: &LoggingConfig) -> Result<BoxSubscriber> {
    build(config, BoxMakeWriter::new(std::io::stderr))
}

/// Install a global subscriber for `config`.
///
/// # Errors
///
/// Fails if the filter directive is invalid or a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    subscriber(config)?
        .try_init()
        .map_err(|e| MockError::config(format!("cannot install tracing subscriber: {e}")))
}

/// Install a global subscriber configured from `INTERCEPT_*` variables.
pub fn init_from_env() -> Result<()> {
    init(&EnvConfig::default().manager_config().logging)
}

/// Install a subscriber that writes through the test harness capture.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_for_tests(config: &LoggingConfig) {
    match build(config, BoxMakeWriter::new(TestWriter::new())) {
        Ok(subscriber) => {
            if let Err(e) = subscriber.try_init() {
                tracing::debug!(error = %e, "test subscriber already installed");
            }
        }
        Err(e) => tracing::warn!(error = %e, "test subscriber not installed"),
    }
}

fn build(config: &LoggingConfig, writer: BoxMakeWriter) -> Result<BoxSubscriber> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        MockError::config(format!("invalid log filter `{}`: {e}", config.level))
    })?;
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.with_target);

    let subscriber: BoxSubscriber = match config.format {
        LogFormat::Json => Box::new(registry.with(layer.json())),
        LogFormat::Pretty => Box::new(registry.with(layer.pretty())),
        LogFormat::Compact => Box::new(registry.with(layer.compact())),
    };
    Ok(subscriber)
}
