//! Testing utilities for code that uses scopes.
//!
//! This module provides ready-made resources with observable state and a
//! few assertion macros.
//!
//! - [`Lock`] - a non-reentrant lock; acquiring it twice fails
//! - [`MockResource`] - records every acquire and release in an [`EventLog`],
//!   with scripted acquire or release failures
//!
//! # Examples
//!
//! ## Lock
//!
//! ```rust
//! use ensconce::testing::{Lock, LockError};
//! use ensconce::{scope, Scoped, ScopeError};
//!
//! let lock = Lock::new("accounts");
//!
//! let nested = scope(Scoped::managed(&lock), |_| {
//!     Ok(scope(Scoped::managed(&lock), |_| Ok(())))
//! });
//!
//! let inner = nested.unwrap();
//! assert_eq!(
//!     inner,
//!     Err(ScopeError::Acquire { index: 0, error: LockError::AlreadyHeld("accounts") })
//! );
//! ```
//!
//! ## Event log
//!
//! ```rust
//! use ensconce::testing::{EventLog, MockResource};
//! use ensconce::{assert_released, scope_all, Scoped};
//!
//! let log = EventLog::new();
//! let a = MockResource::new("a", &log);
//! let b = MockResource::new("b", &log);
//!
//! let _ = scope_all(vec![Scoped::managed(&a), Scoped::managed(&b)], |_| Ok(()));
//! assert_released!(log, ["b", "a"]);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::resource::Resource;

// ============================================================================
// Lock
// ============================================================================

/// Error raised by [`Lock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockError {
    /// The lock was already held when `acquire` ran.
    AlreadyHeld(&'static str),
    /// The lock was not held when `release` ran.
    NotHeld(&'static str),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::AlreadyHeld(name) => write!(f, "lock {} already acquired", name),
            LockError::NotHeld(name) => write!(f, "lock {} not acquired", name),
        }
    }
}

impl std::error::Error for LockError {}

#[derive(Debug)]
struct LockState {
    name: &'static str,
    held: AtomicBool,
}

/// A non-reentrant lock resource.
///
/// Clones share the same state. Acquiring hands back a clone of the lock
/// itself, so the block sees the same handle the caller passed in.
#[derive(Debug, Clone)]
pub struct Lock {
    state: Arc<LockState>,
}

impl Lock {
    /// Create an unheld lock.
    pub fn new(name: &'static str) -> Self {
        Lock {
            state: Arc::new(LockState {
                name,
                held: AtomicBool::new(false),
            }),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &'static str {
        self.state.name
    }

    /// Whether the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.state.held.load(Ordering::SeqCst)
    }
}

impl PartialEq for Lock {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for Lock {}

impl Resource for Lock {
    type Acquired = Lock;
    type Error = LockError;

    fn acquire(&self) -> Result<Lock, LockError> {
        self.state
            .held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LockError::AlreadyHeld(self.state.name))?;
        Ok(self.clone())
    }

    fn release(&self) -> Result<(), LockError> {
        self.state
            .held
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LockError::NotHeld(self.state.name))?;
        Ok(())
    }
}

// ============================================================================
// MockResource
// ============================================================================

/// Something that happened to a [`MockResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// `acquire` succeeded.
    Acquired(&'static str),
    /// `acquire` was called and failed.
    AcquireFailed(&'static str),
    /// `release` succeeded.
    Released(&'static str),
    /// `release` was called and failed.
    ReleaseFailed(&'static str),
}

/// Shared, ordered record of resource events.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<Event>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event so far, in order.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Names of successfully acquired resources, in acquisition order.
    pub fn acquired(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Acquired(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    /// Names of released resources (including failed releases), in release order.
    pub fn released(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Released(name) | Event::ReleaseFailed(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

/// A resource that records its lifecycle and can be told to fail.
///
/// Acquiring yields the resource's name as a `String`. Errors are `String`s.
pub struct MockResource<'a> {
    name: &'static str,
    log: &'a EventLog,
    held: Cell<bool>,
    acquire_error: Option<String>,
    release_error: Option<String>,
}

impl<'a> MockResource<'a> {
    /// Create a resource that always succeeds.
    pub fn new(name: &'static str, log: &'a EventLog) -> Self {
        MockResource {
            name,
            log,
            held: Cell::new(false),
            acquire_error: None,
            release_error: None,
        }
    }

    /// Make `acquire` fail with `error`.
    pub fn fail_acquire(mut self, error: impl Into<String>) -> Self {
        self.acquire_error = Some(error.into());
        self
    }

    /// Make `release` fail with `error`.
    pub fn fail_release(mut self, error: impl Into<String>) -> Self {
        self.release_error = Some(error.into());
        self
    }

    /// Whether the resource is currently acquired.
    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

impl fmt::Debug for MockResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockResource")
            .field("name", &self.name)
            .field("held", &self.held.get())
            .finish()
    }
}

impl Resource for MockResource<'_> {
    type Acquired = String;
    type Error = String;

    fn acquire(&self) -> Result<String, String> {
        if let Some(err) = &self.acquire_error {
            self.log.record(Event::AcquireFailed(self.name));
            return Err(err.clone());
        }
        self.held.set(true);
        self.log.record(Event::Acquired(self.name));
        Ok(self.name.to_string())
    }

    fn release(&self) -> Result<(), String> {
        self.held.set(false);
        if let Some(err) = &self.release_error {
            self.log.record(Event::ReleaseFailed(self.name));
            return Err(err.clone());
        }
        self.log.record(Event::Released(self.name));
        Ok(())
    }
}

// ============================================================================
// Assertion macros
// ============================================================================

/// Assert that a scope result is an acquisition failure at `index`.
///
/// # Example
///
/// ```rust
/// use ensconce::testing::{EventLog, MockResource};
/// use ensconce::{assert_acquire_failed, scope_all, Scoped};
///
/// let log = EventLog::new();
/// let a = MockResource::new("a", &log);
/// let b = MockResource::new("b", &log).fail_acquire("busy");
///
/// let result = scope_all(vec![Scoped::managed(&a), Scoped::managed(&b)], |_| Ok(()));
/// assert_acquire_failed!(result, 1);
/// ```
#[macro_export]
macro_rules! assert_acquire_failed {
    ($result:expr, $index:expr) => {
        match $result {
            Err($crate::ScopeError::Acquire { index, .. }) => {
                assert_eq!(index, $index, "acquisition failed at an unexpected index");
            }
            other => {
                panic!("Expected acquisition failure, got: {:?}", other);
            }
        }
    };
}

/// Assert the exact release order recorded in an [`EventLog`].
///
/// # Example
///
/// ```rust
/// use ensconce::testing::{EventLog, MockResource};
/// use ensconce::{assert_released, scope, Scoped};
///
/// let log = EventLog::new();
/// let a = MockResource::new("a", &log);
///
/// let _ = scope(Scoped::managed(&a), |_| Ok(()));
/// assert_released!(log, ["a"]);
/// ```
#[macro_export]
macro_rules! assert_released {
    ($log:expr, [$($name:expr),* $(,)?]) => {{
        let expected: Vec<&'static str> = vec![$($name),*];
        assert_eq!($log.released(), expected, "unexpected release order");
    }};
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Shape of a generated scope run: how many resources, and which one (if
/// any) fails to acquire.
#[cfg(feature = "proptest")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopePlan {
    /// Number of resources in the sequence, at least one.
    pub len: usize,
    /// Index of the resource whose acquire fails.
    pub fail_at: Option<usize>,
}

#[cfg(feature = "proptest")]
impl Arbitrary for ScopePlan {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (1usize..=8)
            .prop_flat_map(|len| {
                (
                    Just(len),
                    prop_oneof![Just(None), (0..len).prop_map(Some)],
                )
            })
            .prop_map(|(len, fail_at)| ScopePlan { len, fail_at })
            .boxed()
    }
}
