//! Fluent builder for multi-resource scopes.
//!
//! [`acquiring`] starts a chain with one resource, so the sequence is never
//! empty. Chain more entries with [`Acquiring::and`] and
//! [`Acquiring::and_plain`], then finish with [`Acquiring::run`] or
//! [`Acquiring::run_exact`]. Nothing is acquired until the chain is run.
//!
//! # Example
//!
//! ```rust
//! use ensconce::acquiring;
//! use ensconce::testing::{EventLog, MockResource};
//!
//! let log = EventLog::new();
//! let conn = MockResource::new("conn", &log);
//! let file = MockResource::new("file", &log);
//!
//! let out = acquiring(&conn)
//!     .and_plain("SELECT 1".to_string())
//!     .and(&file)
//!     .run_exact(|[c, q, f]: [String; 3]| Ok(format!("{} | {} | {}", c, q, f)));
//!
//! assert_eq!(out, Ok("conn | SELECT 1 | file".to_string()));
//! assert_eq!(log.released(), vec!["file", "conn"]);
//! ```

use std::fmt;

use crate::compose::{scope_exact, scope_seq};
use crate::error::ScopeError;
use crate::resource::{DynResource, Resource, Scoped};
use crate::sequence::ResourceSeq;

/// Builder for a scope over several resources of one type.
#[must_use = "resources are only acquired when the chain is run"]
pub struct Acquiring<R: Resource> {
    entries: ResourceSeq<Scoped<R>>,
}

impl<R: Resource> fmt::Debug for Acquiring<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acquiring")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Start a chain with a managed resource.
pub fn acquiring<R: Resource>(resource: R) -> Acquiring<R> {
    Acquiring {
        entries: ResourceSeq::singleton(Scoped::Managed(resource)),
    }
}

impl<R: Resource> Acquiring<R> {
    /// Start a chain with a plain value.
    pub fn plain(value: R::Acquired) -> Self {
        Acquiring {
            entries: ResourceSeq::singleton(Scoped::Plain(value)),
        }
    }

    /// Add a managed resource. It is acquired after every earlier entry and
    /// released before them.
    pub fn and(mut self, resource: R) -> Self {
        self.entries.push(Scoped::Managed(resource));
        self
    }

    /// Add a plain value, passed to the block unchanged.
    pub fn and_plain(mut self, value: R::Acquired) -> Self {
        self.entries.push(Scoped::Plain(value));
        self
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: a chain starts with one entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Acquire everything and run `block` with the values in chain order.
    pub fn run<T, F>(self, block: F) -> Result<T, ScopeError<R::Error>>
    where
        F: FnOnce(Vec<R::Acquired>) -> Result<T, R::Error>,
    {
        scope_seq(self.entries, block)
    }

    /// Acquire everything and run a block that takes exactly `N` values.
    ///
    /// See [`scope_exact`] for how a count mismatch is reported.
    pub fn run_exact<const N: usize, T, F>(self, block: F) -> Result<T, ScopeError<R::Error>>
    where
        F: FnOnce([R::Acquired; N]) -> Result<T, R::Error>,
    {
        scope_exact(self.entries, block)
    }
}

impl<'a, V, E: fmt::Debug> Acquiring<DynResource<'a, V, E>> {
    /// Start a chain of boxed resources, so later entries may be of other types.
    pub fn boxed<R2>(resource: R2) -> Self
    where
        R2: Resource<Acquired = V, Error = E> + 'a,
    {
        acquiring(Box::new(resource) as DynResource<'a, V, E>)
    }

    /// Add a resource of any type with the same acquired value and error.
    pub fn and_boxed<R2>(self, resource: R2) -> Self
    where
        R2: Resource<Acquired = V, Error = E> + 'a,
    {
        self.and(Box::new(resource))
    }
}
