//! # Ensconce
//!
//! Scoped acquisition of one or many resources, with guaranteed release in
//! reverse order.
//!
//! Give a scope an ordered list of resources and a block. Every resource is
//! acquired left to right, the block runs with all acquired values, and
//! every resource that was acquired is released right to left, whether the
//! block returns, fails, or panics, and whether a later acquisition fails.
//!
//! ## Quick Example
//!
//! ```rust
//! use ensconce::testing::{EventLog, MockResource};
//! use ensconce::{scope_all, Scoped, ScopeError};
//!
//! let log = EventLog::new();
//! let db = MockResource::new("db", &log);
//! let cache = MockResource::new("cache", &log).fail_acquire("cache offline");
//!
//! let result = scope_all(
//!     vec![Scoped::managed(&db), Scoped::managed(&cache)],
//!     |values| Ok(values.len()),
//! );
//!
//! // The cache failed, so the database was released and the block never ran
//! assert_eq!(
//!     result,
//!     Err(ScopeError::Acquire { index: 1, error: "cache offline".to_string() })
//! );
//! assert_eq!(log.released(), vec!["db"]);
//! ```
//!
//! ## Entry points
//!
//! - [`scope`] - one resource
//! - [`scope_all`] / [`scope_seq`] - many resources of one type, block gets a `Vec`
//! - [`scope_exact`] - block gets a `[V; N]`
//! - [`scope_each`] - a tuple of different resource types, block gets a tuple
//! - [`acquiring`] - fluent builder
//!
//! ## Cargo features
//!
//! - `tracing` - emit `tracing` events for acquire, release and superseded failures
//! - `proptest` - `Arbitrary` strategies in [`testing`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod builder;
pub mod compose;
pub mod error;
pub mod resource;
pub mod sequence;
pub mod single;
pub mod testing;
pub mod tuple;

// Re-exports
pub use builder::{acquiring, Acquiring};
pub use compose::{scope_all, scope_exact, scope_seq};
pub use error::{ScopeError, UsageError};
pub use resource::{from_fns, DynResource, FnResource, Plain, Resource, Scoped};
pub use sequence::ResourceSeq;
pub use single::scope;
pub use tuple::{scope_each, Enter, ScopeTuple};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{acquiring, Acquiring};
    pub use crate::compose::{scope_all, scope_exact, scope_seq};
    pub use crate::error::{ScopeError, UsageError};
    pub use crate::resource::{Plain, Resource, Scoped};
    pub use crate::single::scope;
    pub use crate::tuple::scope_each;
}
