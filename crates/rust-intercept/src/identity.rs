//! Call-site identities.
//!
//! A [`CallSite`] names the code entity a behavior is registered against:
//! a function item (including method paths such as `Client::get`), an
//! explicitly named target, or a trait method on a mock receiver.
//!
//! Function identity is derived from the function item's own type. Every
//! function item in Rust has a distinct zero-sized type, so its [`TypeId`] is
//! stable for the whole run and independent of the call. Function pointers
//! and capturing closures have no such identity and are rejected.

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::MockError;

/// Maximum number of parameters a mockable call may take.
pub const MAX_PARAMS: usize = 7;

/// Marker for values that can be called with the argument tuple `Args`.
///
/// Implemented for every `Fn` with up to [`MAX_PARAMS`] parameters, so
/// passing a non-callable value to [`CallSite::function`] fails to compile.
pub trait Callable<Args>: Copy + 'static {}

macro_rules! impl_callable {
    ($($arg:ident),*) => {
        impl<F, Ret, $($arg),*> Callable<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> Ret + Copy + 'static,
        {
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
impl_callable!(A1, A2, A3, A4, A5, A6, A7);

/// Identifier of a mock receiver instance.
///
/// Generated mock structs allocate one at construction and keep it, so the
/// struct can be moved without changing which behaviors it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a new process-unique instance ID.
    #[must_use]
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the inner value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

/// The code entity a call site refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A function item or method path, keyed by its type.
    Function(TypeId),
    /// An explicitly named target.
    Named(Cow<'static, str>),
    /// A method on a receiver type.
    Method {
        /// Type of the receiver.
        receiver_type: TypeId,
        /// Method name.
        method: &'static str,
    },
}

/// Identity of a mockable call.
///
/// Equality and hashing only consider the target and the receiver instance;
/// the label is for diagnostics.
#[derive(Clone)]
pub struct CallSite {
    target: Target,
    instance: Option<InstanceId>,
    label: Cow<'static, str>,
}

impl CallSite {
    /// Identify a function item or method path.
    ///
    /// Methods called through their type (`Client::get`) take the receiver
    /// as first argument, and all receivers share the same behaviors.
    ///
    /// # Panics
    ///
    /// Panics if `f` is not zero-sized (a function pointer or a capturing
    /// closure), since such values have no stable identity.
    #[track_caller]
    pub fn function<F, Args>(f: F) -> Self
    where
        F: Callable<Args>,
    {
        let _ = f;
        if std::mem::size_of::<F>() != 0 {
            MockError::not_callable(format!(
                "`{}` has no stable identity; pass the function by name",
                type_name::<F>()
            ))
            .raise();
        }
        Self {
            target: Target::Function(TypeId::of::<F>()),
            instance: None,
            label: Cow::Owned(function_label(type_name::<F>())),
        }
    }

    /// Identify a target by an explicit, fully-qualified name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    #[track_caller]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            MockError::not_callable("empty call-site name").raise();
        }
        Self {
            label: name.clone(),
            target: Target::Named(name),
            instance: None,
        }
    }

    /// Identify `method` on one specific receiver instance of type `T`.
    #[must_use]
    pub fn method<T: ?Sized + 'static>(instance: InstanceId, method: &'static str) -> Self {
        Self {
            target: Target::Method {
                receiver_type: TypeId::of::<T>(),
                method,
            },
            instance: Some(instance),
            label: Cow::Owned(format!("{}.{method}", short_type_name::<T>())),
        }
    }

    /// Identify `method` on every receiver of type `T`.
    #[must_use]
    pub fn method_of<T: ?Sized + 'static>(method: &'static str) -> Self {
        Self {
            target: Target::Method {
                receiver_type: TypeId::of::<T>(),
                method,
            },
            instance: None,
            label: Cow::Owned(format!("{}.{method}", short_type_name::<T>())),
        }
    }

    /// Get the target.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Get the receiver instance, if bound to one.
    #[must_use]
    pub const fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    /// Get the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check if this call site is a receiver method.
    #[must_use]
    pub const fn is_method(&self) -> bool {
        matches!(self.target, Target::Method { .. })
    }
}

impl PartialEq for CallSite {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.instance == other.instance
    }
}

impl Eq for CallSite {}

impl Hash for CallSite {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.instance.hash(state);
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("label", &self.label)
            .field("target", &self.target)
            .field("instance", &self.instance)
            .finish()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            Some(id) => write!(f, "{} ({id})", self.label),
            None => f.write_str(&self.label),
        }
    }
}

/// Strip generic arguments from a type path.
fn strip_generics(path: &str) -> &str {
    path.split('<').next().unwrap_or(path)
}

/// Last path segment of `T`, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let path = strip_generics(type_name::<T>());
    path.rsplit("::").next().unwrap_or(path)
}

/// Last two path segments of a function's type name (`Client::get`).
fn function_label(path: &str) -> String {
    let path = strip_generics(path);
    let mut segments = path.rsplit("::");
    match (segments.next(), segments.next()) {
        (Some(name), Some(parent)) => format!("{parent}::{name}"),
        (Some(name), None) => name.to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(_key: u32) -> u32 {
        0
    }

    fn store(_key: u32) -> u32 {
        1
    }

    fn generic<T: Default>() -> T {
        T::default()
    }

    struct Client;

    impl Client {
        fn get(&self, _id: u32) -> u32 {
            7
        }
    }

    #[test]
    fn same_function_same_identity() {
        assert_eq!(CallSite::function(lookup), CallSite::function(lookup));
    }

    #[test]
    fn different_functions_differ() {
        assert_ne!(CallSite::function(lookup), CallSite::function(store));
    }

    #[test]
    fn generic_instantiations_differ() {
        assert_ne!(
            CallSite::function(generic::<u32>),
            CallSite::function(generic::<String>)
        );
    }

    #[test]
    fn method_path_identity() {
        let a = CallSite::function(Client::get);
        let b = CallSite::function(Client::get);
        assert_eq!(a, b);
        assert_eq!(a.label(), "Client::get");
        assert!(!a.is_method());
    }

    #[test]
    fn function_label_keeps_two_segments() {
        let site = CallSite::function(lookup);
        assert_eq!(site.label(), "tests::lookup");
    }

    #[test]
    fn receivers_are_isolated() {
        let first = InstanceId::new();
        let second = InstanceId::new();
        let a = CallSite::method::<Client>(first, "get");
        let b = CallSite::method::<Client>(second, "get");
        assert_ne!(a, b);
        assert_eq!(a, CallSite::method::<Client>(first, "get"));
        assert_eq!(a.label(), "Client.get");
        assert_eq!(a.instance(), Some(first));
        assert!(a.is_method());
    }

    #[test]
    fn type_level_method_differs_from_instance() {
        let id = InstanceId::new();
        assert_ne!(
            CallSite::method_of::<Client>("get"),
            CallSite::method::<Client>(id, "get")
        );
    }

    #[test]
    fn label_does_not_affect_equality() {
        let a = CallSite::named("app::get");
        let b = CallSite::named(String::from("app::get"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "app::get");
    }

    #[test]
    fn display_includes_instance() {
        let id = InstanceId::new();
        let site = CallSite::method::<Client>(id, "get");
        assert_eq!(site.to_string(), format!("Client.get ({id})"));
    }

    #[test]
    #[should_panic(expected = "has no stable identity")]
    fn function_pointer_is_rejected() {
        let ptr: fn(u32) -> u32 = lookup;
        let _ = CallSite::function(ptr);
    }

    #[test]
    #[should_panic(expected = "has no stable identity")]
    fn capturing_closure_is_rejected() {
        let offset = 3_u32;
        let _ = CallSite::function(move |x: u32| x + offset);
    }

    #[test]
    #[should_panic(expected = "empty call-site name")]
    fn empty_name_is_rejected() {
        let _ = CallSite::named("");
    }

    #[test]
    fn instance_ids_are_unique() {
        assert_ne!(InstanceId::new(), InstanceId::new());
    }

    #[test]
    fn short_type_name_strips_generics() {
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<Client>(), "Client");
    }
}
