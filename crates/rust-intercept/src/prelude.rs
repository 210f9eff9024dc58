//! Convenient re-exports for common rust-intercept usage.
//!
//! # Example
//!
//! ```
//! use rust_intercept::prelude::*;
//!
//! fn answer() -> u32 {
//!     42
//! }
//!
//! let manager = Manager::new();
//! Mocker0::<(u32,)>::for_fn(&manager, answer).returns_values((7,));
//!
//! let (value,) = call_or(Some(&manager), &CallSite::function(answer), Args::empty(), || {
//!     (answer(),)
//! });
//! assert_eq!(value, 7);
//! ```

// Core types
pub use crate::behavior::{Behavior, Mode};
pub use crate::identity::{CallSite, Callable, InstanceId};
pub use crate::manager::{Manager, ManagerStats};
pub use crate::values::{Args, AsArg, Results, Values, unbox0, unbox1, unbox2, unbox3, unbox4, unbox5};

// Configuration
pub use crate::config::{LogFormat, LoggingConfig, ManagerConfig};

// Error handling
pub use crate::error::{MockError, Result};

// Typed handles
pub use crate::mocker::{Mocker0, Mocker1, Mocker2, Mocker3, Mocker4, Mocker5, Mocker6, Mocker7};

// Dispatch
pub use crate::adapter::{
    call_or, call_or_panic, call_scoped_or, call_with_or, intercept, intercept_scoped,
    intercept_with,
};
pub use crate::context::{Context, current, manager_from, scope, sync_scope, with_manager};
pub use crate::dispatch::{invoke, invoke_scoped, invoke_with, resolve};

// Macros
pub use crate::args;
