//! Untyped argument and result lists.
//!
//! The dispatch engine works on one representation for every call shape:
//! [`Args`] is a borrowed list of `&dyn Any`, one entry per parameter, and
//! [`Values`] is an owned list of boxed results. Typed handles convert
//! between these and concrete tuples.
//!
//! Arguments are exposed by their pointee: a parameter `req: &Request` is
//! passed as a `Request`, a parameter `id: u32` as a `u32`. Behaviors always
//! receive references to the arguments.

use std::any::{Any, type_name};
use std::fmt;

use crate::error::{MockError, Result};

/// Maximum number of result values a mockable call may produce.
pub const MAX_RESULTS: usize = 5;

/// Conversion of a call argument into its untyped form.
///
/// Method-call syntax auto-dereferences, so `req.as_arg()` with
/// `req: &Request` yields the `Request` itself. Use the [`args!`] macro
/// rather than calling this directly.
///
/// [`args!`]: crate::args
pub trait AsArg {
    /// View this value as `&dyn Any`.
    fn as_arg(&self) -> &dyn Any;
}

impl<T: Any> AsArg for T {
    fn as_arg(&self) -> &dyn Any {
        self
    }
}

/// Build an untyped argument array from call parameters.
///
/// Parameters should be places (function parameters or local variables).
///
/// ```
/// use rust_intercept::{Args, args};
///
/// struct Request { value: u32 }
///
/// let req = &Request { value: 5 };
/// let id = 7_u32;
/// let list = args![req, id];
/// let args = Args::new(&list);
/// assert_eq!(args.get::<Request>(0).map(|r| r.value), Some(5));
/// assert_eq!(args.get::<u32>(1), Some(&7));
/// ```
#[macro_export]
macro_rules! args {
    () => {{
        let list: [&dyn ::std::any::Any; 0] = [];
        list
    }};
    ($($arg:expr),+ $(,)?) => {{
        use $crate::AsArg as _;
        [$( ($arg).as_arg() ),+]
    }};
}

/// Borrowed list of call arguments.
#[derive(Clone, Copy)]
pub struct Args<'a> {
    values: &'a [&'a dyn Any],
}

impl<'a> Args<'a> {
    /// Wrap an argument slice.
    #[must_use]
    pub const fn new(values: &'a [&'a dyn Any]) -> Self {
        Self { values }
    }

    /// An empty argument list.
    #[must_use]
    pub const fn empty() -> Self {
        Self { values: &[] }
    }

    /// Number of arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get argument `index` as a `T`.
    #[must_use]
    pub fn get<T: Any>(&self, index: usize) -> Option<&'a T> {
        self.values.get(index).and_then(|v| v.downcast_ref::<T>())
    }

    /// Get argument `index` as a `T`, reporting a typed error on mismatch.
    pub fn typed<T: Any>(&self, label: &str, index: usize) -> Result<&'a T> {
        self.get::<T>(index).ok_or_else(|| MockError::ArgumentType {
            label: label.to_string(),
            index,
            expected: type_name::<T>(),
        })
    }

    /// Ensure the list holds exactly `expected` arguments.
    pub fn check_arity(&self, label: &str, expected: usize) -> Result<()> {
        if self.values.len() == expected {
            Ok(())
        } else {
            Err(MockError::ArgumentArity {
                label: label.to_string(),
                expected,
                got: self.values.len(),
            })
        }
    }
}

impl fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("len", &self.len()).finish()
    }
}

/// Owned list of result values.
#[derive(Default)]
pub struct Values(Vec<Box<dyn Any>>);

impl Values {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Create from boxed values.
    #[must_use]
    pub const fn from_vec(values: Vec<Box<dyn Any>>) -> Self {
        Self(values)
    }

    /// Append a value.
    pub fn push<T: Any>(&mut self, value: T) {
        self.0.push(Box::new(value));
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow value `index` as a `T`.
    #[must_use]
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.0.get(index).and_then(|v| v.downcast_ref::<T>())
    }

    /// Convert into a typed result tuple.
    pub fn unbox<R: Results>(self) -> Result<R> {
        R::from_values(self)
    }

    /// Get the boxed values.
    #[must_use]
    pub fn into_inner(self) -> Vec<Box<dyn Any>> {
        self.0
    }

    fn check_arity(&self, expected: usize) -> Result<()> {
        if self.0.len() == expected {
            Ok(())
        } else {
            Err(MockError::ResultArity {
                expected,
                got: self.0.len(),
            })
        }
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("len", &self.len()).finish()
    }
}

/// A tuple of result values, one element per result slot.
///
/// Implemented for `()` and tuples of up to [`MAX_RESULTS`] elements. A
/// function returning `Result<Response, Error>` has one slot and uses
/// `(Result<Response, Error>,)`.
pub trait Results: Sized + 'static {
    /// Number of result slots.
    const ARITY: usize;

    /// Box each element.
    fn into_values(self) -> Values;

    /// Unbox exactly [`Self::ARITY`] values.
    fn from_values(values: Values) -> Result<Self>;
}

fn take<T: Any>(
    slots: &mut impl Iterator<Item = (usize, Box<dyn Any>)>,
    expected: usize,
) -> Result<T> {
    let (index, value) = slots
        .next()
        .ok_or(MockError::ResultArity { expected, got: 0 })?;
    value
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| MockError::ResultType {
            index,
            expected: type_name::<T>(),
        })
}

macro_rules! impl_results {
    ($n:expr; $($r:ident),*) => {
        impl<$($r: 'static),*> Results for ($($r,)*) {
            const ARITY: usize = $n;

            #[allow(non_snake_case)]
            fn into_values(self) -> Values {
                let ($($r,)*) = self;
                Values::from_vec(vec![$(Box::new($r) as Box<dyn Any>),*])
            }

            fn from_values(values: Values) -> Result<Self> {
                values.check_arity($n)?;
                #[allow(unused_mut, unused_variables)]
                let mut slots = values.0.into_iter().enumerate();
                Ok(($(take::<$r>(&mut slots, $n)?,)*))
            }
        }
    };
}

impl_results!(0;);
impl_results!(1; R1);
impl_results!(2; R1, R2);
impl_results!(3; R1, R2, R3);
impl_results!(4; R1, R2, R3, R4);
impl_results!(5; R1, R2, R3, R4, R5);

/// Check that no values were produced.
pub fn unbox0(values: Values) -> Result<()> {
    values.unbox::<()>()
}

/// Extract a single result value.
///
/// Fails if there is not exactly one value or if it is not an `R1`.
pub fn unbox1<R1: 'static>(values: Values) -> Result<R1> {
    let (r1,) = values.unbox::<(R1,)>()?;
    Ok(r1)
}

/// Extract two result values.
pub fn unbox2<R1: 'static, R2: 'static>(values: Values) -> Result<(R1, R2)> {
    values.unbox()
}

/// Extract three result values.
pub fn unbox3<R1: 'static, R2: 'static, R3: 'static>(values: Values) -> Result<(R1, R2, R3)> {
    values.unbox()
}

/// Extract four result values.
pub fn unbox4<R1: 'static, R2: 'static, R3: 'static, R4: 'static>(
    values: Values,
) -> Result<(R1, R2, R3, R4)> {
    values.unbox()
}

/// Extract five result values.
pub fn unbox5<R1: 'static, R2: 'static, R3: 'static, R4: 'static, R5: 'static>(
    values: Values,
) -> Result<(R1, R2, R3, R4, R5)> {
    values.unbox()
}
