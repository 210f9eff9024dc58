//! Scoped manager propagation.
//!
//! Code under test rarely takes a [`Manager`] parameter. Two carriers let a
//! test hand one down anyway:
//!
//! - [`Context`], an immutable parent-linked value chain that the code under
//!   test threads through its calls. [`with_manager`] derives a child that
//!   carries a manager and [`manager_from`] finds it again from that child or
//!   any context derived from it.
//! - A task-local binding ([`scope`], [`sync_scope`], [`current`]) for code
//!   that does not pass a context around.
//!
//! Both carriers are scoped: nothing is installed process-wide, so
//! independent tests can run concurrently with their own managers.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::manager::Manager;

struct Node {
    parent: Option<Arc<Node>>,
    value: Box<dyn Any + Send + Sync>,
}

/// An immutable chain of scoped values.
///
/// Cloning is cheap. Deriving a child never changes the parent.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context carrying `value`.
    ///
    /// A value of the same type further up the chain is shadowed.
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Node {
                parent: self.head.clone(),
                value: Box::new(value),
            })),
        }
    }

    /// Find the nearest value of type `T`.
    #[must_use]
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if let Some(value) = current.value.downcast_ref::<T>() {
                return Some(value);
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Number of values in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = current.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .field("manager", &manager_from(self).map(|m| m.name().to_string()))
            .finish()
    }
}

struct Binding(Arc<Manager>);

/// Derive a context that carries `manager`.
#[must_use]
pub fn with_manager(ctx: &Context, manager: Arc<Manager>) -> Context {
    ctx.with_value(Binding(manager))
}

/// Get the manager carried by `ctx` or one of its ancestors.
#[must_use]
pub fn manager_from(ctx: &Context) -> Option<Arc<Manager>> {
    ctx.value::<Binding>().map(|binding| Arc::clone(&binding.0))
}

tokio::task_local! {
    static CURRENT: Arc<Manager>;
}

/// Run `future` with `manager` bound as the current manager.
///
/// The binding is visible to [`current`] inside the future only, including
/// across `.await` points. Tasks spawned from inside are not covered and
/// need their own scope.
pub async fn scope<F: Future>(manager: Arc<Manager>, future: F) -> F::Output {
    CURRENT.scope(manager, future).await
}

/// Run `f` with `manager` bound as the current manager.
pub fn sync_scope<R>(manager: Arc<Manager>, f: impl FnOnce() -> R) -> R {
    CURRENT.sync_scope(manager, f)
}

/// The manager of the innermost enclosing scope, if any.
#[must_use]
pub fn current() -> Option<Arc<Manager>> {
    CURRENT.try_with(Arc::clone).ok()
}
