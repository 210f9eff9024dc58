//! Typed behavior handles.
//!
//! Registering a behavior returns a `MockerN` handle, where `N` is the number
//! of parameters of the mocked call. The handle is generic over the pointee
//! type of each parameter (`T1..TN`) and over the result tuple `R`, and
//! converts typed closures into the untyped slots of a [`Behavior`].
//!
//! ```
//! use rust_intercept::prelude::*;
//!
//! struct Request { value: u32 }
//!
//! fn get(req: &Request) -> String {
//!     format!("real {}", req.value)
//! }
//!
//! let manager = Manager::new();
//! Mocker1::<Request, (String,)>::for_fn(&manager, get)
//!     .when(|req| req.value == 5)
//!     .returns(|| ("mocked".to_string(),));
//!
//! let req = &Request { value: 5 };
//! let list = args![req];
//! let values = invoke(Some(&manager), &CallSite::function(get), Args::new(&list));
//! assert_eq!(unbox1::<String>(values.unwrap()).unwrap(), "mocked");
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::behavior::{Behavior, Mode};
use crate::identity::{CallSite, Callable};
use crate::manager::Manager;
use crate::values::Results;

macro_rules! mocker {
    ($(#[$doc:meta])* $name:ident, $n:expr; $($t:ident $a:ident $i:tt),*) => {
        $(#[$doc])*
        pub struct $name<$($t,)* R> {
            behavior: Arc<Behavior>,
            label: Cow<'static, str>,
            _marker: PhantomData<fn($(&$t),*) -> R>,
        }

        impl<$($t: Any,)* R: Results> $name<$($t,)* R> {
            /// Register a new behavior for `site` and return its handle.
            #[must_use]
            pub fn new(manager: &Manager, site: CallSite) -> Self {
                let behavior = Arc::new(Behavior::new());
                let label = Cow::Owned(site.label().to_string());
                manager.register(site, Arc::clone(&behavior));
                Self {
                    behavior,
                    label,
                    _marker: PhantomData,
                }
            }

            /// Register a new behavior for the function item `f`.
            ///
            /// # Panics
            ///
            /// Panics if `f` has no stable identity (see
            /// [`CallSite::function`]).
            #[must_use]
            #[track_caller]
            pub fn for_fn<F, Params>(manager: &Manager, f: F) -> Self
            where
                F: Callable<Params>,
            {
                Self::new(manager, CallSite::function(f))
            }

            /// Handle every call with `f`.
            pub fn handle<F>(&self, f: F)
            where
                F: Fn($(&$t),*) -> R + Send + Sync + 'static,
            {
                let label = self.label.clone();
                self.behavior.set_handler(move |args| {
                    args.check_arity(&label, $n)?;
                    $(let $a = args.typed::<$t>(&label, $i)?;)*
                    Ok(Some(f($($a),*).into_values()))
                });
            }

            /// Handle calls with `f`, which may decline by returning `None`.
            ///
            /// A declined call runs the real implementation.
            pub fn try_handle<F>(&self, f: F)
            where
                F: Fn($(&$t),*) -> Option<R> + Send + Sync + 'static,
            {
                let label = self.label.clone();
                self.behavior.set_handler(move |args| {
                    args.check_arity(&label, $n)?;
                    $(let $a = args.typed::<$t>(&label, $i)?;)*
                    Ok(f($($a),*).map(Results::into_values))
                });
            }

            /// Handle every call with `f`, if there is one.
            ///
            /// `None` removes an installed handler, so the behavior leaves
            /// handler mode.
            pub fn handle_opt<F>(&self, f: Option<F>)
            where
                F: Fn($(&$t),*) -> R + Send + Sync + 'static,
            {
                match f {
                    Some(f) => self.handle(f),
                    None => self.behavior.clear_handler(),
                }
            }

            /// Fire only for calls matching `f`.
            ///
            /// Replaces an earlier predicate.
            #[must_use]
            pub fn when<F>(self, f: F) -> Self
            where
                F: Fn($(&$t),*) -> bool + Send + Sync + 'static,
            {
                let label = self.label.clone();
                self.behavior.set_predicate(move |args| {
                    args.check_arity(&label, $n)?;
                    $(let $a = args.typed::<$t>(&label, $i)?;)*
                    Ok(f($($a),*))
                });
                self
            }

            /// Fire for every call.
            #[must_use]
            pub fn always(self) -> Self {
                self.behavior.set_predicate(|_| Ok(true));
                self
            }

            /// Produce the results with `f` when the behavior fires.
            pub fn returns<F>(&self, f: F)
            where
                F: Fn() -> R + Send + Sync + 'static,
            {
                self.behavior.set_returns(move || f().into_values());
            }

            /// Produce a copy of `results` when the behavior fires.
            pub fn returns_values(&self, results: R)
            where
                R: Clone + Send + Sync,
            {
                self.behavior.set_returns(move || results.clone().into_values());
            }

            /// Produce default results when the behavior fires.
            pub fn returns_default(&self)
            where
                R: Default,
            {
                self.behavior.set_returns(|| R::default().into_values());
            }

            /// Answer every call with default results.
            pub fn ignore(&self)
            where
                R: Default,
            {
                self.behavior.set_predicate(|_| Ok(true));
                self.returns_default();
            }

            /// Current mode of the behavior.
            #[must_use]
            pub fn mode(&self) -> Mode {
                self.behavior.mode()
            }

            /// The untyped behavior behind this handle.
            #[must_use]
            pub const fn behavior(&self) -> &Arc<Behavior> {
                &self.behavior
            }

            /// Label of the call site this handle was registered for.
            #[must_use]
            pub fn label(&self) -> &str {
                &self.label
            }
        }

        impl<$($t,)* R> Clone for $name<$($t,)* R> {
            fn clone(&self) -> Self {
                Self {
                    behavior: Arc::clone(&self.behavior),
                    label: self.label.clone(),
                    _marker: PhantomData,
                }
            }
        }

        impl<$($t,)* R> fmt::Debug for $name<$($t,)* R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("label", &self.label)
                    .field("behavior", &self.behavior)
                    .finish()
            }
        }
    };
}

mocker!(
    /// Handle for a behavior on a call without parameters.
    Mocker0, 0;
);
mocker!(
    /// Handle for a behavior on a call with one parameter.
    Mocker1, 1; T1 a1 0
);
mocker!(
    /// Handle for a behavior on a call with two parameters.
    Mocker2, 2; T1 a1 0, T2 a2 1
);
mocker!(
    /// Handle for a behavior on a call with three parameters.
    Mocker3, 3; T1 a1 0, T2 a2 1, T3 a3 2
);
mocker!(
    /// Handle for a behavior on a call with four parameters.
    Mocker4, 4; T1 a1 0, T2 a2 1, T3 a3 2, T4 a4 3
);
mocker!(
    /// Handle for a behavior on a call with five parameters.
    Mocker5, 5; T1 a1 0, T2 a2 1, T3 a3 2, T4 a4 3, T5 a5 4
);
mocker!(
    /// Handle for a behavior on a call with six parameters.
    Mocker6, 6; T1 a1 0, T2 a2 1, T3 a3 2, T4 a4 3, T5 a5 4, T6 a6 5
);
mocker!(
    /// Handle for a behavior on a call with seven parameters.
    Mocker7, 7; T1 a1 0, T2 a2 1, T3 a3 2, T4 a4 3, T5 a5 4, T6 a6 5, T7 a7 6
);
