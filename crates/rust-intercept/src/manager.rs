//! The behavior registry.
//!
//! A [`Manager`] maps call-site identities to the behaviors registered for
//! them, in registration order. Tests create one explicitly and hand it to
//! the code under test, either directly or through a scoped carrier (see
//! [`context`](crate::context)). There is no process-wide default manager.
//!
//! Registration is expected to finish before concurrent dispatch starts.
//! The map is still guarded by an `RwLock`, and dispatch scans a snapshot of
//! the record list, so a late registration can never change a list while a
//! call is walking it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::behavior::Behavior;
use crate::config::ManagerConfig;
use crate::config::env::EnvConfig;
use crate::identity::CallSite;

/// Dispatch counters of a manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Total resolutions against this manager.
    ///
    /// Always the sum of the three outcome counters.
    pub dispatches: usize,
    /// Resolutions that produced mocked results.
    pub handled: usize,
    /// Resolutions that fell through.
    pub unhandled: usize,
    /// Resolutions that failed with a configuration error.
    pub failures: usize,
}

impl ManagerStats {
    /// Ratio of handled dispatches (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing was dispatched.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn handled_rate(&self) -> f64 {
        if self.dispatches == 0 {
            0.0
        } else {
            self.handled as f64 / self.dispatches as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    handled: AtomicUsize,
    unhandled: AtomicUsize,
    failures: AtomicUsize,
}

/// Outcome of one resolution, for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Handled,
    Unhandled,
    Failed,
}

type Registry = HashMap<CallSite, Vec<Arc<Behavior>>>;

/// Registry of mock behaviors keyed by call site.
pub struct Manager {
    mockers: RwLock<Registry>,
    config: ManagerConfig,
    counters: Counters,
}

impl Manager {
    /// Create an empty manager with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create an empty manager with the given configuration.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            mockers: RwLock::new(HashMap::new()),
            config,
            counters: Counters::default(),
        }
    }

    /// Create an empty manager configured from `INTERCEPT_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(EnvConfig::default().manager_config())
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Name reported in log events.
    #[must_use]
    pub fn name(&self) -> &str {
        self.config.display_name()
    }

    /// Append a behavior to the list of `site`.
    ///
    /// No deduplication is done; behaviors are evaluated in the order they
    /// were registered.
    pub fn register(&self, site: CallSite, behavior: Arc<Behavior>) {
        let mut mockers = self.write();
        tracing::debug!(
            manager = self.name(),
            call_site = %site,
            "registering behavior"
        );
        mockers.entry(site).or_default().push(behavior);
    }

    /// Remove every registered behavior.
    ///
    /// Handles created before the reset stay usable but are no longer
    /// consulted by dispatch.
    pub fn reset(&self) {
        let previous = std::mem::take(&mut *self.write());
        tracing::debug!(
            manager = self.name(),
            call_sites = previous.len(),
            "reset manager"
        );
    }

    /// Behaviors registered for `site`, in registration order.
    #[must_use]
    pub fn lookup(&self, site: &CallSite) -> Vec<Arc<Behavior>> {
        self.read().get(site).cloned().unwrap_or_default()
    }

    /// Number of behaviors registered for `site`.
    #[must_use]
    pub fn behavior_count(&self, site: &CallSite) -> usize {
        self.read().get(site).map_or(0, Vec::len)
    }

    /// Number of call sites with at least one behavior.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if no behavior is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered call sites, in no particular order.
    #[must_use]
    pub fn call_sites(&self) -> Vec<CallSite> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of the dispatch counters.
    ///
    /// Counters are read one at a time, so under concurrent dispatch a
    /// snapshot may miss calls still in flight.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let handled = self.counters.handled.load(Ordering::Relaxed);
        let unhandled = self.counters.unhandled.load(Ordering::Relaxed);
        let failures = self.counters.failures.load(Ordering::Relaxed);
        ManagerStats {
            dispatches: handled + unhandled + failures,
            handled,
            unhandled,
            failures,
        }
    }

    pub(crate) fn count(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Handled => &self.counters.handled,
            Outcome::Unhandled => &self.counters.unhandled,
            Outcome::Failed => &self.counters.failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // Registration and reset never run user code under the lock, so a
    // poisoned map is still consistent.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.mockers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Registry> {
        self.mockers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("name", &self.name())
            .field("call_sites", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
