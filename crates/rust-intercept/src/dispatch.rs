//! The dispatch engine.
//!
//! [`resolve`] decides, for one intercepted call, which registered behavior
//! fires. Records are scanned in registration order:
//!
//! 1. Without a manager, or without records, the call is not handled.
//! 2. A conditional record whose predicate matches produces the results at
//!    once; later records are not looked at.
//! 3. A handler record is held back until the scan ends and only runs if no
//!    conditional record matched. A second, different handler record for the
//!    same call site is a configuration error.
//!
//! [`invoke`] and friends wrap [`resolve`] and turn configuration errors into
//! panics, which is what interception adapters want.

use std::sync::Arc;

use crate::behavior::{Behavior, HandlerFn, Mode, Slots};
use crate::context::{self, Context};
use crate::error::{MockError, Result};
use crate::identity::CallSite;
use crate::manager::{Manager, Outcome};
use crate::values::{Args, Values};

/// Resolve an intercepted call against `manager`.
///
/// Returns `Ok(Some(values))` when a behavior handled the call and
/// `Ok(None)` when the real implementation should run.
///
/// # Errors
///
/// Returns [`MockError::DuplicateHandler`], [`MockError::MixedModes`] or
/// [`MockError::MissingReturn`] for misconfigured behaviors, and passes
/// through errors raised by predicates and handlers.
pub fn resolve(
    manager: Option<&Manager>,
    site: &CallSite,
    args: Args<'_>,
) -> Result<Option<Values>> {
    let Some(manager) = manager else {
        return Ok(None);
    };

    let records = manager.lookup(site);
    let resolved = scan(manager, site, &records, args);

    let outcome = match &resolved {
        Ok(Some(_)) => Outcome::Handled,
        Ok(None) => Outcome::Unhandled,
        Err(_) => Outcome::Failed,
    };
    manager.count(outcome);
    report(manager, site, records.len(), outcome, resolved.as_ref().err());

    resolved
}

fn scan(
    manager: &Manager,
    site: &CallSite,
    records: &[Arc<Behavior>],
    args: Args<'_>,
) -> Result<Option<Values>> {
    if records.is_empty() {
        return Ok(None);
    }

    let snapshots: Vec<Slots> = records.iter().map(|r| r.snapshot()).collect();
    if manager.config().strict_modes && is_mixed(&snapshots) {
        return Err(MockError::mixed_modes(site.label()));
    }

    let mut pending: Option<(&Arc<Behavior>, HandlerFn)> = None;
    for (record, slots) in records.iter().zip(snapshots) {
        if let Some(handler) = slots.handler {
            match pending.as_ref().map(|(held, _)| Arc::ptr_eq(held, record)) {
                Some(false) => return Err(MockError::duplicate_handler(site.label())),
                Some(true) => {}
                None => pending = Some((record, handler)),
            }
            continue;
        }

        let Some(predicate) = slots.predicate else {
            continue;
        };
        if predicate(args)? {
            let returns = slots
                .returns
                .ok_or_else(|| MockError::missing_return(site.label()))?;
            return Ok(Some(returns()));
        }
    }

    match pending {
        Some((_, handler)) => handler(args),
        None => Ok(None),
    }
}

fn is_mixed(snapshots: &[Slots]) -> bool {
    let handlers = snapshots.iter().any(|s| s.mode() == Mode::Handler);
    let conditionals = snapshots
        .iter()
        .any(|s| s.mode() == Mode::Conditional && s.has_condition());
    handlers && conditionals
}

fn report(
    manager: &Manager,
    site: &CallSite,
    records: usize,
    outcome: Outcome,
    error: Option<&MockError>,
) {
    if let Some(error) = error {
        tracing::warn!(
            manager = manager.name(),
            call_site = %site,
            records,
            %error,
            "mock dispatch failed"
        );
    } else if manager.config().trace_dispatch {
        tracing::debug!(manager = manager.name(), call_site = %site, records, ?outcome, "dispatch");
    } else {
        tracing::trace!(manager = manager.name(), call_site = %site, records, ?outcome, "dispatch");
    }
}

/// Resolve an intercepted call, panicking on configuration errors.
#[track_caller]
pub fn invoke(manager: Option<&Manager>, site: &CallSite, args: Args<'_>) -> Option<Values> {
    match resolve(manager, site, args) {
        Ok(values) => values,
        Err(err) => err.raise(),
    }
}

/// Like [`invoke`], with the manager bound to `ctx`.
#[track_caller]
pub fn invoke_with(ctx: &Context, site: &CallSite, args: Args<'_>) -> Option<Values> {
    let manager = context::manager_from(ctx);
    invoke(manager.as_deref(), site, args)
}

/// Like [`invoke`], with the manager of the current task-local scope.
#[track_caller]
pub fn invoke_scoped(site: &CallSite, args: Args<'_>) -> Option<Values> {
    let manager = context::current();
    invoke(manager.as_deref(), site, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::config::ManagerConfig;
    use crate::values::{Results, unbox1};

    fn lookup(_key: u32) -> String {
        String::new()
    }

    fn registered(manager: &Manager) -> Arc<Behavior> {
        let behavior = Arc::new(Behavior::new());
        manager.register(CallSite::function(lookup), Arc::clone(&behavior));
        behavior
    }

    fn call(manager: &Manager, key: u32) -> Result<Option<String>> {
        let list = args![key];
        resolve(Some(manager), &CallSite::function(lookup), Args::new(&list))?
            .map(unbox1::<String>)
            .transpose()
    }

    fn returning(behavior: &Behavior, text: &'static str) {
        behavior.set_returns(move || (text.to_string(),).into_values());
    }

    #[test]
    fn no_manager_is_unhandled() {
        let key = 1_u32;
        let list = args![key];
        let resolved = resolve(None, &CallSite::function(lookup), Args::new(&list)).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn no_records_is_unhandled() {
        let manager = Manager::new();
        assert_eq!(call(&manager, 1).unwrap(), None);
        assert_eq!(manager.stats().unhandled, 1);
    }

    #[test]
    fn first_matching_conditional_wins() {
        let manager = Manager::new();
        let first = registered(&manager);
        first.set_predicate(|args| Ok(*args.typed::<u32>("lookup", 0)? > 5));
        returning(&first, "first");
        let second = registered(&manager);
        returning(&second, "second");

        assert_eq!(call(&manager, 9).unwrap().as_deref(), Some("first"));
        assert_eq!(call(&manager, 1).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn unconfigured_record_is_skipped() {
        let manager = Manager::new();
        let _skipped = registered(&manager);
        assert_eq!(call(&manager, 1).unwrap(), None);
    }

    #[test]
    fn conditional_wins_over_earlier_handler() {
        let manager = Manager::new();
        let handler = registered(&manager);
        handler.set_handler(|_| Ok(Some(("handler".to_string(),).into_values())));
        let conditional = registered(&manager);
        returning(&conditional, "conditional");

        assert_eq!(call(&manager, 1).unwrap().as_deref(), Some("conditional"));
    }

    #[test]
    fn handler_is_fallback() {
        let manager = Manager::new();
        let conditional = registered(&manager);
        conditional.set_predicate(|_| Ok(false));
        returning(&conditional, "conditional");
        let handler = registered(&manager);
        handler.set_handler(|_| Ok(Some(("handler".to_string(),).into_values())));

        assert_eq!(call(&manager, 1).unwrap().as_deref(), Some("handler"));
    }

    #[test]
    fn declining_handler_is_unhandled() {
        let manager = Manager::new();
        registered(&manager).set_handler(|_| Ok(None));
        assert_eq!(call(&manager, 1).unwrap(), None);
    }

    #[test]
    fn duplicate_handler_fails() {
        let manager = Manager::new();
        registered(&manager).set_handler(|_| Ok(None));
        registered(&manager).set_handler(|_| Ok(None));

        let err = call(&manager, 1).unwrap_err();
        assert!(matches!(err, MockError::DuplicateHandler { .. }));
        assert_eq!(err.label(), Some("tests::lookup"));
        assert_eq!(manager.stats().failures, 1);
    }

    #[test]
    fn same_handler_record_twice_is_not_duplicate() {
        let manager = Manager::new();
        let behavior = Arc::new(Behavior::new());
        behavior.set_handler(|_| Ok(Some(("once".to_string(),).into_values())));
        manager.register(CallSite::function(lookup), Arc::clone(&behavior));
        manager.register(CallSite::function(lookup), behavior);

        assert_eq!(call(&manager, 1).unwrap().as_deref(), Some("once"));
    }

    #[test]
    fn matched_predicate_without_returns_fails() {
        let manager = Manager::new();
        registered(&manager).set_predicate(|_| Ok(true));

        let err = call(&manager, 1).unwrap_err();
        assert!(matches!(err, MockError::MissingReturn { .. }));
    }

    #[test]
    fn unmatched_predicate_without_returns_is_fine() {
        let manager = Manager::new();
        registered(&manager).set_predicate(|_| Ok(false));
        assert_eq!(call(&manager, 1).unwrap(), None);
    }

    #[test]
    fn strict_modes_reject_mixing() {
        let manager = Manager::with_config(ManagerConfig::new().strict_modes(true));
        returning(&registered(&manager), "conditional");
        registered(&manager).set_handler(|_| Ok(None));

        let err = call(&manager, 1).unwrap_err();
        assert!(matches!(err, MockError::MixedModes { .. }));
    }

    #[test]
    fn strict_modes_allow_single_mode() {
        let manager = Manager::with_config(ManagerConfig::new().strict_modes(true));
        returning(&registered(&manager), "only");
        let _unconfigured = registered(&manager);

        assert_eq!(call(&manager, 1).unwrap().as_deref(), Some("only"));
    }

    #[test]
    fn predicate_errors_propagate() {
        let manager = Manager::new();
        let behavior = registered(&manager);
        behavior.set_predicate(|args| args.typed::<String>("lookup", 0).map(|_| true));
        returning(&behavior, "never");

        let err = call(&manager, 1).unwrap_err();
        assert!(matches!(err, MockError::ArgumentType { index: 0, .. }));
    }

    #[test]
    fn handlers_may_reenter_the_manager() {
        let manager = Arc::new(Manager::new());
        let inner = Arc::clone(&manager);
        let behavior = Arc::new(Behavior::new());
        behavior.set_handler(move |_| {
            // Registration from inside a running behavior must not deadlock.
            inner.register(CallSite::named("other"), Arc::new(Behavior::new()));
            Ok(Some(("reentrant".to_string(),).into_values()))
        });
        manager.register(CallSite::function(lookup), behavior);

        assert_eq!(call(&manager, 1).unwrap().as_deref(), Some("reentrant"));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    #[should_panic(expected = "duplicate handler registered for tests::lookup")]
    fn invoke_panics_on_configuration_error() {
        let manager = Manager::new();
        registered(&manager).set_handler(|_| Ok(None));
        registered(&manager).set_handler(|_| Ok(None));

        let key = 1_u32;
        let list = args![key];
        let _ = invoke(Some(&manager), &CallSite::function(lookup), Args::new(&list));
    }

    #[test]
    fn invoke_with_unbound_context_is_unhandled() {
        let key = 1_u32;
        let list = args![key];
        let resolved = invoke_with(
            &Context::background(),
            &CallSite::function(lookup),
            Args::new(&list),
        );
        assert!(resolved.is_none());
    }

    #[test]
    fn invoke_scoped_outside_scope_is_unhandled() {
        let key = 1_u32;
        let list = args![key];
        assert!(invoke_scoped(&CallSite::function(lookup), Args::new(&list)).is_none());
    }
}
