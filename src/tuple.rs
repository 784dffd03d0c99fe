//! Scopes over heterogeneous tuples.
//!
//! [`scope_all`](crate::scope_all) needs every entry to share one resource
//! type. [`scope_each`] takes a tuple instead, so each position can be a
//! different resource type (or a [`Plain`] value) as long as all of them
//! share an error type. The block receives a flat tuple of acquired values
//! in the same positions.
//!
//! Tuples of 1 to 8 entries are supported. Each entry implements [`Enter`]:
//!
//! | Entry | Value passed to the block |
//! |-------|---------------------------|
//! | `&R` where `R: Resource` | `R::Acquired` |
//! | `Scoped<R>` | `R::Acquired` |
//! | `Plain<V>` | `V` |
//!
//! # Example
//!
//! ```rust
//! use ensconce::testing::{Lock, LockError};
//! use ensconce::{scope_each, Plain};
//!
//! let accounts = Lock::new("accounts");
//! let ledger = Lock::new("ledger");
//!
//! let summary = scope_each((&accounts, Plain(250_u32), &ledger), |(a, amount, l)| {
//!     Ok::<_, LockError>(format!("{} -> {}: {}", a.name(), l.name(), amount))
//! });
//!
//! assert_eq!(summary, Ok("accounts -> ledger: 250".to_string()));
//! assert!(!accounts.is_held() && !ledger.is_held());
//! ```

use crate::error::ScopeError;
use crate::resource::{Plain, Resource, Scoped};
use crate::single;

/// One position of a tuple scope.
pub trait Enter<E> {
    /// Value handed to the block for this position.
    type Value;

    /// Enter this entry as position `index` and run `f` inside it.
    fn enter<T, F>(self, index: usize, f: F) -> Result<T, ScopeError<E>>
    where
        F: FnOnce(Self::Value) -> Result<T, ScopeError<E>>;
}

impl<R: Resource> Enter<R::Error> for Scoped<R> {
    type Value = R::Acquired;

    fn enter<T, F>(self, index: usize, f: F) -> Result<T, ScopeError<R::Error>>
    where
        F: FnOnce(Self::Value) -> Result<T, ScopeError<R::Error>>,
    {
        single::enter(index, self, f)
    }
}

impl<'a, R: Resource> Enter<R::Error> for &'a R {
    type Value = R::Acquired;

    fn enter<T, F>(self, index: usize, f: F) -> Result<T, ScopeError<R::Error>>
    where
        F: FnOnce(Self::Value) -> Result<T, ScopeError<R::Error>>,
    {
        single::enter(index, Scoped::Managed(self), f)
    }
}

impl<V, E> Enter<E> for Plain<V> {
    type Value = V;

    fn enter<T, F>(self, _index: usize, f: F) -> Result<T, ScopeError<E>>
    where
        F: FnOnce(V) -> Result<T, ScopeError<E>>,
    {
        f(self.0)
    }
}

/// A tuple of [`Enter`] entries that can be scoped together.
pub trait ScopeTuple<E> {
    /// Flat tuple of the values the block receives.
    type Values;

    /// Enter every entry left to right and run `block` with all values.
    fn scope_with<T, F>(self, block: F) -> Result<T, ScopeError<E>>
    where
        F: FnOnce(Self::Values) -> Result<T, E>;
}

// Expands to nested `enter` calls, accumulating acquired values until the
// innermost level calls the block.
macro_rules! nest_entries {
    ($block:ident; [$($done:ident)*];) => {
        $block(($($done,)*)).map_err(ScopeError::Block)
    };
    ($block:ident; [$($done:ident)*]; $idx:tt $T:ident $(, $ridx:tt $RT:ident)*) => {
        $T.enter($idx, move |$T| nest_entries!($block; [$($done)* $T]; $($ridx $RT),*))
    };
}

macro_rules! impl_scope_tuple {
    ($($idx:tt $T:ident),+) => {
        impl<E, $($T: Enter<E>),+> ScopeTuple<E> for ($($T,)+) {
            type Values = ($(<$T as Enter<E>>::Value,)+);

            #[allow(non_snake_case)]
            fn scope_with<T, F>(self, block: F) -> Result<T, ScopeError<E>>
            where
                F: FnOnce(Self::Values) -> Result<T, E>,
            {
                let ($($T,)+) = self;
                nest_entries!(block; []; $($idx $T),+)
            }
        }
    };
}

impl_scope_tuple!(0 A1);
impl_scope_tuple!(0 A1, 1 A2);
impl_scope_tuple!(0 A1, 1 A2, 2 A3);
impl_scope_tuple!(0 A1, 1 A2, 2 A3, 3 A4);
impl_scope_tuple!(0 A1, 1 A2, 2 A3, 3 A4, 4 A5);
impl_scope_tuple!(0 A1, 1 A2, 2 A3, 3 A4, 4 A5, 5 A6);
impl_scope_tuple!(0 A1, 1 A2, 2 A3, 3 A4, 4 A5, 5 A6, 6 A7);
impl_scope_tuple!(0 A1, 1 A2, 2 A3, 3 A4, 4 A5, 5 A6, 6 A7, 7 A8);

/// Enter every entry of a tuple and run `block` with a flat tuple of values.
///
/// Ordering, unwinding and error semantics are the same as
/// [`scope_all`](crate::scope_all). A tuple cannot be empty, so there is no
/// usage error here.
pub fn scope_each<E, S, T, F>(entries: S, block: F) -> Result<T, ScopeError<E>>
where
    S: ScopeTuple<E>,
    F: FnOnce(S::Values) -> Result<T, E>,
{
    entries.scope_with(block)
}
