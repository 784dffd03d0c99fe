//! The resource capability contract.
//!
//! A resource is anything that needs setup before use and teardown after.
//! The contract is the [`Resource`] trait: `acquire` is required, `release`
//! defaults to doing nothing. Whether a value takes part in the contract at
//! all is decided by [`Scoped`]:
//!
//! | Variant | Acquire | Release |
//! |---------|---------|---------|
//! | `Scoped::Managed(r)` | `r.acquire()` | `r.release()` |
//! | `Scoped::Plain(v)` | `v` is used as-is | nothing |
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use ensconce::{scope, Resource, Scoped};
//!
//! struct Counter(Cell<u32>);
//!
//! impl Resource for Counter {
//!     type Acquired = u32;
//!     type Error = String;
//!
//!     fn acquire(&self) -> Result<u32, String> {
//!         self.0.set(self.0.get() + 1);
//!         Ok(self.0.get())
//!     }
//! }
//!
//! let counter = Counter(Cell::new(0));
//! let seen = scope(Scoped::managed(&counter), |n| Ok::<_, String>(n * 10));
//! assert_eq!(seen, Ok(10));
//! ```

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A value with an acquire step and an optional release step.
///
/// Methods take `&self`: resources that guard state use interior
/// mutability and are responsible for their own serialization. A
/// non-reentrant resource should fail `acquire` while it is held.
pub trait Resource {
    /// Value handed to the block once acquisition succeeds.
    type Acquired;
    /// Error produced by `acquire` or `release`.
    ///
    /// `Debug` so a release failure during a panic can still be reported.
    type Error: fmt::Debug;

    /// Transition into the active state.
    fn acquire(&self) -> Result<Self::Acquired, Self::Error>;

    /// Tear down after use. Called at most once per successful `acquire`.
    fn release(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<R: Resource + ?Sized> Resource for &R {
    type Acquired = R::Acquired;
    type Error = R::Error;

    fn acquire(&self) -> Result<Self::Acquired, Self::Error> {
        (**self).acquire()
    }

    fn release(&self) -> Result<(), Self::Error> {
        (**self).release()
    }
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    type Acquired = R::Acquired;
    type Error = R::Error;

    fn acquire(&self) -> Result<Self::Acquired, Self::Error> {
        (**self).acquire()
    }

    fn release(&self) -> Result<(), Self::Error> {
        (**self).release()
    }
}

impl<R: Resource + ?Sized> Resource for Rc<R> {
    type Acquired = R::Acquired;
    type Error = R::Error;

    fn acquire(&self) -> Result<Self::Acquired, Self::Error> {
        (**self).acquire()
    }

    fn release(&self) -> Result<(), Self::Error> {
        (**self).release()
    }
}

impl<R: Resource + ?Sized> Resource for Arc<R> {
    type Acquired = R::Acquired;
    type Error = R::Error;

    fn acquire(&self) -> Result<Self::Acquired, Self::Error> {
        (**self).acquire()
    }

    fn release(&self) -> Result<(), Self::Error> {
        (**self).release()
    }
}

/// A boxed resource trait object, for sequences mixing resource types that
/// share an acquired value type and error type.
pub type DynResource<'a, V, E> = Box<dyn Resource<Acquired = V, Error = E> + 'a>;

/// One entry of a scope: either a managed resource or a plain value.
pub enum Scoped<R: Resource> {
    /// Acquired on entry, released on exit.
    Managed(R),
    /// Passed through to the block unchanged; never released.
    Plain(R::Acquired),
}

impl<R: Resource> Scoped<R> {
    /// Wrap a resource that takes part in acquire/release.
    pub fn managed(resource: R) -> Self {
        Scoped::Managed(resource)
    }

    /// Wrap a value that is used as-is.
    pub fn plain(value: R::Acquired) -> Self {
        Scoped::Plain(value)
    }

    /// Returns `true` if this entry will be acquired and released.
    pub fn is_managed(&self) -> bool {
        matches!(self, Scoped::Managed(_))
    }
}

impl<'a, V, E: fmt::Debug> Scoped<DynResource<'a, V, E>> {
    /// Box a resource so it can share a sequence with other resource types.
    pub fn boxed<R>(resource: R) -> Self
    where
        R: Resource<Acquired = V, Error = E> + 'a,
    {
        Scoped::Managed(Box::new(resource))
    }
}

impl<R: Resource> fmt::Debug for Scoped<R>
where
    R::Acquired: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoped::Managed(_) => f.debug_tuple("Managed").field(&"<resource>").finish(),
            Scoped::Plain(v) => f.debug_tuple("Plain").field(v).finish(),
        }
    }
}

/// A capability-less value for heterogeneous tuple scopes.
///
/// See [`scope_each`](crate::scope_each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Plain<V>(pub V);

/// A resource built from an acquire closure and a release closure.
///
/// Created by [`from_fns`].
pub struct FnResource<Acq, Rel> {
    acquire: Acq,
    release: Rel,
}

impl<Acq, Rel> fmt::Debug for FnResource<Acq, Rel> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResource")
            .field("acquire", &"<function>")
            .field("release", &"<function>")
            .finish()
    }
}

impl<Acq, Rel, V, E> Resource for FnResource<Acq, Rel>
where
    Acq: Fn() -> Result<V, E>,
    Rel: Fn() -> Result<(), E>,
    E: fmt::Debug,
{
    type Acquired = V;
    type Error = E;

    fn acquire(&self) -> Result<V, E> {
        (self.acquire)()
    }

    fn release(&self) -> Result<(), E> {
        (self.release)()
    }
}

/// Build a resource from a pair of closures.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use ensconce::{from_fns, scope, Scoped};
///
/// let log = RefCell::new(Vec::new());
/// let conn = from_fns(
///     || {
///         log.borrow_mut().push("open");
///         Ok::<_, String>("conn")
///     },
///     || {
///         log.borrow_mut().push("close");
///         Ok(())
///     },
/// );
///
/// let out = scope(Scoped::managed(&conn), |c| Ok(c.len()));
/// assert_eq!(out, Ok(4));
/// assert_eq!(*log.borrow(), vec!["open", "close"]);
/// ```
pub fn from_fns<Acq, Rel, V, E>(acquire: Acq, release: Rel) -> FnResource<Acq, Rel>
where
    Acq: Fn() -> Result<V, E>,
    Rel: Fn() -> Result<(), E>,
{
    FnResource { acquire, release }
}
