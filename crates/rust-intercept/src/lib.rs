//! rust-intercept: call interception and dispatch for test doubles
//!
//! This crate lets a test substitute the behavior of functions, methods and
//! trait objects without changing their call sites. Intercepted code asks a
//! [`Manager`] whether a registered behavior handles the call; if none does,
//! the real implementation runs.
//!
//! # Features
//!
//! - **Explicit managers**: no global registry, so independent tests can run
//!   concurrently
//! - **Conditional behaviors** (`when` / `returns`) evaluated in registration
//!   order, first match wins
//! - **Catch-all handlers** that only run when no conditional behavior matched
//! - **Fail-fast configuration errors** (duplicate handlers, missing return
//!   values, result type mismatches)
//! - **Scoped propagation** through a [`Context`] chain or a task-local scope
//! - **Structured logging** of registration and dispatch via `tracing`
//!
//! # Example
//!
//! ```
//! use rust_intercept::prelude::*;
//!
//! struct Request { value: u32 }
//!
//! fn get(manager: Option<&Manager>, req: &Request) -> (u32, String) {
//!     call_or(manager, &CallSite::function(get), Args::new(&args![req]), || {
//!         (9, "xxx".to_string())
//!     })
//! }
//!
//! let manager = Manager::new();
//! Mocker1::<Request, (u32, String)>::for_fn(&manager, get)
//!     .when(|req| req.value == 5)
//!     .returns(|| (1, "abc".to_string()));
//!
//! assert_eq!(get(Some(&manager), &Request { value: 5 }), (1, "abc".to_string()));
//! assert_eq!(get(Some(&manager), &Request { value: 6 }), (9, "xxx".to_string()));
//! ```

pub mod adapter;
pub mod behavior;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod logging;
pub mod manager;
pub mod mocker;
pub mod prelude;
pub mod testing;
pub mod values;

pub use adapter::{
    call_or, call_or_panic, call_scoped_or, call_with_or, intercept, intercept_scoped,
    intercept_with,
};
pub use behavior::{Behavior, HandlerFn, Mode, PredicateFn, ReturnFn, Slots};
pub use config::{LogFormat, LoggingConfig, ManagerConfig};
pub use context::{Context, current, manager_from, scope, sync_scope, with_manager};
pub use dispatch::{invoke, invoke_scoped, invoke_with, resolve};
pub use error::{MockError, Result};
pub use identity::{CallSite, Callable, InstanceId, MAX_PARAMS, Target};
pub use manager::{Manager, ManagerStats};
pub use mocker::{Mocker0, Mocker1, Mocker2, Mocker3, Mocker4, Mocker5, Mocker6, Mocker7};
pub use values::{
    Args, AsArg, MAX_RESULTS, Results, Values, unbox0, unbox1, unbox2, unbox3, unbox4, unbox5,
};
