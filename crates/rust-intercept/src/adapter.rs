//! Call-shape adapters.
//!
//! These are the helpers an intercepted function or a hand-written mock
//! struct calls at its entry point. They box the arguments, dispatch, and
//! unbox the results into the concrete tuple type, panicking on any
//! mismatch so that a broken test fails at the call that exposed it.
//!
//! A mockable function keeps its real body as the fallback:
//!
//! ```
//! use rust_intercept::prelude::*;
//!
//! struct Request { id: u32 }
//!
//! fn get(manager: Option<&Manager>, req: &Request) -> String {
//!     let (text,) = call_or(manager, &CallSite::function(get), Args::new(&args![req]), || {
//!         (format!("real {}", req.id),)
//!     });
//!     text
//! }
//!
//! let manager = Manager::new();
//! assert_eq!(get(Some(&manager), &Request { id: 1 }), "real 1");
//!
//! Mocker1::<Request, (String,)>::for_fn(&manager, get)
//!     .returns_values(("mocked".to_string(),));
//! assert_eq!(get(Some(&manager), &Request { id: 1 }), "mocked");
//! ```

use crate::context::{self, Context};
use crate::dispatch::invoke;
use crate::error::MockError;
use crate::identity::CallSite;
use crate::manager::Manager;
use crate::values::{Args, Results, Values};

#[track_caller]
fn unbox<R: Results>(values: Values) -> R {
    match values.unbox::<R>() {
        Ok(results) => results,
        Err(err) => err.raise(),
    }
}

/// Dispatch and unbox; `None` means the real implementation should run.
///
/// # Panics
///
/// Panics on configuration errors and when the mocked results do not match
/// `R`.
#[track_caller]
pub fn intercept<R: Results>(
    manager: Option<&Manager>,
    site: &CallSite,
    args: Args<'_>,
) -> Option<R> {
    match invoke(manager, site, args) {
        Some(values) => Some(unbox(values)),
        None => None,
    }
}

/// Like [`intercept`], with the manager bound to `ctx`.
#[track_caller]
pub fn intercept_with<R: Results>(ctx: &Context, site: &CallSite, args: Args<'_>) -> Option<R> {
    let manager = context::manager_from(ctx);
    intercept(manager.as_deref(), site, args)
}

/// Like [`intercept`], with the manager of the current task-local scope.
#[track_caller]
pub fn intercept_scoped<R: Results>(site: &CallSite, args: Args<'_>) -> Option<R> {
    let manager = context::current();
    intercept(manager.as_deref(), site, args)
}

/// Dispatch, falling back to `real` when no behavior handles the call.
#[track_caller]
pub fn call_or<R: Results>(
    manager: Option<&Manager>,
    site: &CallSite,
    args: Args<'_>,
    real: impl FnOnce() -> R,
) -> R {
    match intercept(manager, site, args) {
        Some(results) => results,
        None => real(),
    }
}

/// Like [`call_or`], with the manager bound to `ctx`.
#[track_caller]
pub fn call_with_or<R: Results>(
    ctx: &Context,
    site: &CallSite,
    args: Args<'_>,
    real: impl FnOnce() -> R,
) -> R {
    match intercept_with(ctx, site, args) {
        Some(results) => results,
        None => real(),
    }
}

/// Like [`call_or`], with the manager of the current task-local scope.
#[track_caller]
pub fn call_scoped_or<R: Results>(site: &CallSite, args: Args<'_>, real: impl FnOnce() -> R) -> R {
    match intercept_scoped(site, args) {
        Some(results) => results,
        None => real(),
    }
}

/// Dispatch a call that has no real implementation.
///
/// Used by mock structs standing in for trait objects.
///
/// # Panics
///
/// Panics with `no mock code matched for <label>` when no behavior handles
/// the call.
#[track_caller]
pub fn call_or_panic<R: Results>(manager: Option<&Manager>, site: &CallSite, args: Args<'_>) -> R {
    match intercept(manager, site, args) {
        Some(results) => results,
        None => MockError::unmatched(site.label()).raise(),
    }
}
