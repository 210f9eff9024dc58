//! Behavior records.
//!
//! A [`Behavior`] is one registered mock rule. It has three slots that are
//! filled in right after registration through a typed handle:
//!
//! - a handler, which makes the record a catch-all for its call site;
//! - a predicate and a return producer, which make it a conditional rule.
//!
//! The slots operate on the untyped [`Args`] / [`Values`] lists, so the
//! dispatch engine can treat every call shape alike.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;
use crate::values::{Args, Values};

/// Untyped handler. `Ok(None)` means the handler declined the call.
pub type HandlerFn = Arc<dyn Fn(Args<'_>) -> Result<Option<Values>> + Send + Sync>;

/// Untyped predicate.
pub type PredicateFn = Arc<dyn Fn(Args<'_>) -> Result<bool> + Send + Sync>;

/// Untyped return producer.
pub type ReturnFn = Arc<dyn Fn() -> Values + Send + Sync>;

/// How a behavior takes part in dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A handler is installed; the record handles every call.
    Handler,
    /// No handler; the record fires when its predicate matches.
    Conditional,
}

/// The configured slots of a behavior at one point in time.
#[derive(Clone, Default)]
pub struct Slots {
    /// Installed handler.
    pub handler: Option<HandlerFn>,
    /// Installed predicate.
    pub predicate: Option<PredicateFn>,
    /// Installed return producer.
    pub returns: Option<ReturnFn>,
}

impl Slots {
    /// Mode these slots resolve to. A handler always takes precedence.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.handler.is_some() {
            Mode::Handler
        } else {
            Mode::Conditional
        }
    }

    /// Check if a conditional rule has been configured.
    #[must_use]
    pub const fn has_condition(&self) -> bool {
        self.predicate.is_some() || self.returns.is_some()
    }
}

fn always(_: Args<'_>) -> Result<bool> {
    Ok(true)
}

/// A registered unit of mocked behavior.
#[derive(Default)]
pub struct Behavior {
    slots: RwLock<Slots>,
}

impl Behavior {
    /// Create an unconfigured behavior.
    ///
    /// Until a slot is set, the record is conditional without a predicate
    /// and never matches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.read().mode()
    }

    /// Check if any slot has been set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let slots = self.read();
        slots.handler.is_some() || slots.has_condition()
    }

    /// Install a handler.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(Args<'_>) -> Result<Option<Values>> + Send + Sync + 'static,
    {
        self.write().handler = Some(Arc::new(handler));
    }

    /// Remove the handler, if any.
    pub fn clear_handler(&self) {
        self.write().handler = None;
    }

    /// Install or replace the predicate.
    pub fn set_predicate<F>(&self, predicate: F)
    where
        F: Fn(Args<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        self.write().predicate = Some(Arc::new(predicate));
    }

    /// Install the return producer.
    ///
    /// If no predicate was installed before, the predicate becomes
    /// always-true.
    pub fn set_returns<F>(&self, returns: F)
    where
        F: Fn() -> Values + Send + Sync + 'static,
    {
        let mut slots = self.write();
        if slots.predicate.is_none() {
            slots.predicate = Some(Arc::new(always));
        }
        slots.returns = Some(Arc::new(returns));
    }

    /// Copy out the current slots.
    ///
    /// Dispatch runs user closures on the snapshot, never under the lock.
    #[must_use]
    pub fn snapshot(&self) -> Slots {
        self.read().clone()
    }

    // A panicking user closure never runs under this lock, so a poisoned
    // lock still holds consistent slots.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.read();
        f.debug_struct("Behavior")
            .field("mode", &slots.mode())
            .field("handler", &slots.handler.is_some())
            .field("predicate", &slots.predicate.is_some())
            .field("returns", &slots.returns.is_some())
            .finish()
    }
}
