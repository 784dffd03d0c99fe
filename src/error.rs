//! Error types for scoped acquisition.
//!
//! Every failure a scope can produce is a [`ScopeError`]. Each variant
//! identifies which phase failed and, where it applies, the position of the
//! resource in the sequence:
//!
//! - [`ScopeError::Usage`] - the call itself was malformed (no resources)
//! - [`ScopeError::Acquire`] - a resource failed to acquire
//! - [`ScopeError::Block`] - the caller's block failed
//! - [`ScopeError::Arity`] - a fixed-arity block got the wrong number of values
//! - [`ScopeError::Release`] - a release step failed while unwinding
//!
//! # Superseded failures
//!
//! A release failure replaces whatever outcome was travelling outward at
//! that level. The replaced failure is not dropped: it is kept in
//! `superseded` and returned by [`std::error::Error::source`].
//!
//! ```rust
//! use ensconce::ScopeError;
//!
//! let err: ScopeError<&str> = ScopeError::Release {
//!     index: 0,
//!     error: "unlock failed",
//!     superseded: Some(Box::new(ScopeError::Block("query failed"))),
//! };
//!
//! assert_eq!(err.release_error(), Some(&"unlock failed"));
//! assert_eq!(err.superseded().and_then(|e| e.block_error()), Some(&"query failed"));
//! ```

use std::fmt;

/// A malformed invocation, detected before any resource is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageError {
    /// The scope was entered with an empty resource sequence.
    NoResources,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::NoResources => write!(f, "scope entered with no resources"),
        }
    }
}

impl std::error::Error for UsageError {}

/// Error returned by every scope operation.
///
/// `E` is the error type shared by the resources and the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError<E> {
    /// The invocation was malformed; nothing was acquired.
    Usage(UsageError),
    /// Acquisition of the resource at `index` failed.
    ///
    /// Every resource before `index` was released before this error was
    /// returned. The failing resource itself is never released.
    Acquire {
        /// Position of the failing resource in the sequence.
        index: usize,
        /// The resource's own error.
        error: E,
    },
    /// The block failed after every resource was acquired.
    Block(E),
    /// A fixed-arity block received a different number of values.
    Arity {
        /// Number of values the block accepts.
        expected: usize,
        /// Number of values the scope produced.
        actual: usize,
    },
    /// Release of the resource at `index` failed.
    Release {
        /// Position of the resource whose release failed.
        index: usize,
        /// The resource's own error.
        error: E,
        /// The failure that was propagating when release ran, if any.
        superseded: Option<Box<ScopeError<E>>>,
    },
}

impl<E> ScopeError<E> {
    /// Returns `true` for [`ScopeError::Usage`].
    pub fn is_usage(&self) -> bool {
        matches!(self, ScopeError::Usage(_))
    }

    /// Returns the acquire error, if any.
    pub fn acquire_error(&self) -> Option<&E> {
        match self {
            ScopeError::Acquire { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the block error, if any.
    pub fn block_error(&self) -> Option<&E> {
        match self {
            ScopeError::Block(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the release error, if any.
    pub fn release_error(&self) -> Option<&E> {
        match self {
            ScopeError::Release { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Position of the resource that failed, for acquire and release errors.
    pub fn index(&self) -> Option<usize> {
        match self {
            ScopeError::Acquire { index, .. } | ScopeError::Release { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The failure a release error replaced, if any.
    pub fn superseded(&self) -> Option<&ScopeError<E>> {
        match self {
            ScopeError::Release { superseded, .. } => superseded.as_deref(),
            _ => None,
        }
    }

    /// Maps the resource error type using the provided function.
    pub fn map<F, E2>(self, f: F) -> ScopeError<E2>
    where
        F: Fn(E) -> E2,
    {
        self.map_with(&f)
    }

    fn map_with<F, E2>(self, f: &F) -> ScopeError<E2>
    where
        F: Fn(E) -> E2,
    {
        match self {
            ScopeError::Usage(u) => ScopeError::Usage(u),
            ScopeError::Acquire { index, error } => ScopeError::Acquire {
                index,
                error: f(error),
            },
            ScopeError::Block(e) => ScopeError::Block(f(e)),
            ScopeError::Arity { expected, actual } => ScopeError::Arity { expected, actual },
            ScopeError::Release {
                index,
                error,
                superseded,
            } => ScopeError::Release {
                index,
                error: f(error),
                superseded: superseded.map(|s| Box::new(s.map_with(f))),
            },
        }
    }
}

impl<E> From<UsageError> for ScopeError<E> {
    fn from(err: UsageError) -> Self {
        ScopeError::Usage(err)
    }
}

impl<E: fmt::Display> fmt::Display for ScopeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::Usage(u) => write!(f, "{}", u),
            ScopeError::Acquire { index, error } => {
                write!(f, "acquire failed for resource {}: {}", index, error)
            }
            ScopeError::Block(e) => write!(f, "{}", e),
            ScopeError::Arity { expected, actual } => write!(
                f,
                "block expects {} values but scope produced {}",
                expected, actual
            ),
            ScopeError::Release {
                index,
                error,
                superseded: None,
            } => write!(f, "release failed for resource {}: {}", index, error),
            ScopeError::Release {
                index,
                error,
                superseded: Some(prev),
            } => write!(
                f,
                "release failed for resource {}: {} (superseding: {})",
                index, error, prev
            ),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ScopeError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScopeError::Usage(u) => Some(u),
            ScopeError::Acquire { error, .. } => Some(error),
            ScopeError::Block(e) => Some(e),
            ScopeError::Arity { .. } => None,
            ScopeError::Release {
                superseded: Some(prev),
                ..
            } => Some(prev.as_ref()),
            ScopeError::Release { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn scope_error_display() {
        let usage: ScopeError<&str> = ScopeError::Usage(UsageError::NoResources);
        assert_eq!(format!("{}", usage), "scope entered with no resources");

        let acquire: ScopeError<&str> = ScopeError::Acquire {
            index: 2,
            error: "busy",
        };
        assert_eq!(format!("{}", acquire), "acquire failed for resource 2: busy");

        let block: ScopeError<&str> = ScopeError::Block("boom");
        assert_eq!(format!("{}", block), "boom");

        let arity: ScopeError<&str> = ScopeError::Arity {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            format!("{}", arity),
            "block expects 2 values but scope produced 3"
        );

        let release: ScopeError<&str> = ScopeError::Release {
            index: 0,
            error: "stuck",
            superseded: Some(Box::new(ScopeError::Block("boom"))),
        };
        assert_eq!(
            format!("{}", release),
            "release failed for resource 0: stuck (superseding: boom)"
        );
    }

    #[test]
    fn scope_error_accessors() {
        let acquire: ScopeError<&str> = ScopeError::Acquire {
            index: 1,
            error: "busy",
        };
        assert_eq!(acquire.acquire_error(), Some(&"busy"));
        assert_eq!(acquire.block_error(), None);
        assert_eq!(acquire.release_error(), None);
        assert_eq!(acquire.index(), Some(1));
        assert!(!acquire.is_usage());

        let block: ScopeError<&str> = ScopeError::Block("boom");
        assert_eq!(block.block_error(), Some(&"boom"));
        assert_eq!(block.index(), None);
        assert_eq!(block.superseded(), None);

        let usage: ScopeError<&str> = UsageError::NoResources.into();
        assert!(usage.is_usage());
    }

    #[test]
    fn scope_error_map_reaches_superseded_chain() {
        let err: ScopeError<i32> = ScopeError::Release {
            index: 1,
            error: 7,
            superseded: Some(Box::new(ScopeError::Acquire { index: 2, error: 9 })),
        };

        let mapped = err.map(|x| x.to_string());
        assert_eq!(
            mapped,
            ScopeError::Release {
                index: 1,
                error: "7".to_string(),
                superseded: Some(Box::new(ScopeError::Acquire {
                    index: 2,
                    error: "9".to_string(),
                })),
            }
        );
    }

    #[test]
    fn source_prefers_superseded_failure() {
        let io = || std::io::Error::other("disk");
        let err: ScopeError<std::io::Error> = ScopeError::Release {
            index: 0,
            error: std::io::Error::other("unlock"),
            superseded: Some(Box::new(ScopeError::Block(io()))),
        };

        let source = err.source().map(|s| s.to_string());
        assert_eq!(source, Some("disk".to_string()));
    }
}
