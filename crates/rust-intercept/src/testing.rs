//! Assertion helpers for mock tests.
//!
//! Misconfigured behaviors fail fast by panicking at the intercepted call.
//! These helpers catch such a panic and check its message, which is handier
//! than `#[should_panic]` when a test needs to go on afterwards.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Extract the message of a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&'static str>().copied())
}

/// Run `f`, returning its value or the message it panicked with.
pub fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        panic_message(payload.as_ref())
            .unwrap_or("<non-string panic payload>")
            .to_string()
    })
}

/// Assert that `f` panics with a message containing `needle`.
///
/// Returns the full panic message.
#[track_caller]
pub fn assert_panics_with<R>(f: impl FnOnce() -> R, needle: &str) -> String {
    match catch_panic(f) {
        Ok(_) => panic!("Expected a panic containing {needle:?}, but the call returned"),
        Err(message) => {
            assert!(
                message.contains(needle),
                "Expected a panic containing {needle:?}, but got:\n{message}"
            );
            message
        }
    }
}
