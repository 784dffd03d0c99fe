//! Single-resource scope.
//!
//! [`scope`] acquires one resource, runs a continuation with the acquired
//! value, and releases the resource on every way out of the continuation:
//!
//! 1. **Acquire**: `Managed` entries call `acquire`; `Plain` values are used as-is
//! 2. **Use**: the continuation runs inside `catch_unwind`
//! 3. **Release**: runs exactly once if acquire succeeded, even after a panic
//!
//! If acquire fails the resource is not released. If release fails, its
//! error replaces the continuation's outcome and any failure it replaces is
//! kept as the superseded cause.
//!
//! # Example
//!
//! ```rust
//! use ensconce::testing::{Lock, LockError};
//! use ensconce::{scope, Scoped};
//!
//! let lock = Lock::new("db");
//!
//! let held_inside = scope(Scoped::managed(&lock), |guard| Ok::<_, LockError>(guard.is_held()));
//!
//! assert_eq!(held_inside, Ok(true));
//! assert!(!lock.is_held());
//! ```

use std::panic::{self, AssertUnwindSafe};

use crate::error::ScopeError;
use crate::resource::{Resource, Scoped};

/// Run `f` with one acquired resource, releasing it afterwards.
///
/// Block failures are returned as [`ScopeError::Block`].
pub fn scope<R, T, F>(resource: Scoped<R>, f: F) -> Result<T, ScopeError<R::Error>>
where
    R: Resource,
    F: FnOnce(R::Acquired) -> Result<T, R::Error>,
{
    enter(0, resource, |acquired| f(acquired).map_err(ScopeError::Block))
}

/// Scope one entry at position `index` of a larger sequence.
///
/// The continuation already speaks `ScopeError`, so errors raised by inner
/// levels pass through untouched.
pub(crate) fn enter<R, T, F>(
    index: usize,
    entry: Scoped<R>,
    continuation: F,
) -> Result<T, ScopeError<R::Error>>
where
    R: Resource,
    F: FnOnce(R::Acquired) -> Result<T, ScopeError<R::Error>>,
{
    let resource = match entry {
        Scoped::Plain(value) => return continuation(value),
        Scoped::Managed(resource) => resource,
    };

    let acquired = match resource.acquire() {
        Ok(acquired) => acquired,
        Err(error) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(index, "resource acquisition failed");
            return Err(ScopeError::Acquire { index, error });
        }
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(index, "resource acquired");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| continuation(acquired)));

    // Release runs regardless of how the continuation exited
    let released = resource.release();

    match outcome {
        Ok(result) => settle(index, result, released),
        Err(payload) => {
            // A panic cannot carry the release error, so report it here
            if let Err(ref error) = released {
                #[cfg(feature = "tracing")]
                tracing::error!(index, ?error, "resource release failed while unwinding a panic");
                #[cfg(not(feature = "tracing"))]
                eprintln!(
                    "resource {} release failed while unwinding a panic: {:?}",
                    index, error
                );
            }
            panic::resume_unwind(payload)
        }
    }
}

fn settle<T, E>(
    index: usize,
    result: Result<T, ScopeError<E>>,
    released: Result<(), E>,
) -> Result<T, ScopeError<E>> {
    match (result, released) {
        (result, Ok(())) => {
            #[cfg(feature = "tracing")]
            tracing::trace!(index, "resource released");
            result
        }
        (Ok(_), Err(error)) => Err(ScopeError::Release {
            index,
            error,
            superseded: None,
        }),
        (Err(prev), Err(error)) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(index, "resource release failed and supersedes an earlier failure");
            Err(ScopeError::Release {
                index,
                error,
                superseded: Some(Box::new(prev)),
            })
        }
    }
}
