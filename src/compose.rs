//! Composing many single-resource scopes into one.
//!
//! [`scope_all`] enters every resource of a sequence, left to right, then
//! calls the block with all acquired values in the same order. Each
//! resource is scoped inside the previous one, so on the way out they are
//! released right to left:
//!
//! ```text
//! enter(r0, |v0|
//!     enter(r1, |v1|
//!         enter(r2, |v2| block([v0, v1, v2]))))
//! ```
//!
//! If resource *k* fails to acquire, resources `0..k` are released in
//! reverse order before the error reaches the caller, and the block never
//! runs. If the block fails, all resources are released.
//!
//! # Block shapes
//!
//! | Function | Block receives |
//! |----------|----------------|
//! | [`scope_all`] | `Vec<V>` |
//! | [`scope_seq`] | `Vec<V>`, from a [`ResourceSeq`] |
//! | [`scope_exact`] | `[V; N]` |
//!
//! For resources of different types see [`scope_each`](crate::scope_each).
//!
//! # Example
//!
//! ```rust
//! use ensconce::testing::{EventLog, MockResource};
//! use ensconce::{scope_all, Scoped};
//!
//! let log = EventLog::new();
//! let a = MockResource::new("a", &log);
//! let b = MockResource::new("b", &log);
//!
//! let joined = scope_all(
//!     vec![Scoped::managed(&a), Scoped::plain("mid".to_string()), Scoped::managed(&b)],
//!     |values| Ok(values.join("+")),
//! );
//!
//! assert_eq!(joined, Ok("a+mid+b".to_string()));
//! assert_eq!(log.released(), vec!["b", "a"]);
//! ```

use crate::error::{ScopeError, UsageError};
use crate::resource::{Resource, Scoped};
use crate::sequence::ResourceSeq;
use crate::single;

/// Enter every resource in order and run `block` with all acquired values.
///
/// Returns [`UsageError::NoResources`] (wrapped in [`ScopeError::Usage`])
/// without touching anything if `resources` is empty.
///
/// Each entry is one level of recursion, so stack depth grows with the
/// length of `resources`.
pub fn scope_all<I, R, T, F>(resources: I, block: F) -> Result<T, ScopeError<R::Error>>
where
    I: IntoIterator<Item = Scoped<R>>,
    R: Resource,
    F: FnOnce(Vec<R::Acquired>) -> Result<T, R::Error>,
{
    enter_all(resources, |values| block(values).map_err(ScopeError::Block))
}

/// Like [`scope_all`], for a sequence that is non-empty by construction.
pub fn scope_seq<R, T, F>(resources: ResourceSeq<Scoped<R>>, block: F) -> Result<T, ScopeError<R::Error>>
where
    R: Resource,
    F: FnOnce(Vec<R::Acquired>) -> Result<T, R::Error>,
{
    let capacity = resources.len();
    nest(
        0,
        resources.into_iter(),
        Vec::with_capacity(capacity),
        |values| block(values).map_err(ScopeError::Block),
    )
}

/// Like [`scope_all`], with a block that takes exactly `N` values.
///
/// The count is checked when the block is about to be called, after every
/// resource has been acquired. A mismatch is reported as
/// [`ScopeError::Arity`] and all acquired resources are released, the same
/// as any other block failure.
///
/// # Example
///
/// ```rust
/// use ensconce::testing::{EventLog, MockResource};
/// use ensconce::{scope_exact, Scoped, ScopeError};
///
/// let log = EventLog::new();
/// let a = MockResource::new("a", &log);
/// let b = MockResource::new("b", &log);
///
/// let pair = scope_exact(vec![Scoped::managed(&a), Scoped::managed(&b)], |[x, y]: [String; 2]| {
///     Ok(format!("{}{}", y, x))
/// });
/// assert_eq!(pair, Ok("ba".to_string()));
///
/// let wrong = scope_exact(vec![Scoped::managed(&a)], |[x, y]: [String; 2]| Ok(x + &y));
/// assert_eq!(wrong, Err(ScopeError::Arity { expected: 2, actual: 1 }));
/// ```
pub fn scope_exact<const N: usize, I, R, T, F>(
    resources: I,
    block: F,
) -> Result<T, ScopeError<R::Error>>
where
    I: IntoIterator<Item = Scoped<R>>,
    R: Resource,
    F: FnOnce([R::Acquired; N]) -> Result<T, R::Error>,
{
    enter_all(resources, |values| {
        let actual = values.len();
        let values: [R::Acquired; N] = values
            .try_into()
            .map_err(|_| ScopeError::Arity {
                expected: N,
                actual,
            })?;
        block(values).map_err(ScopeError::Block)
    })
}

fn enter_all<I, R, T, F>(resources: I, block: F) -> Result<T, ScopeError<R::Error>>
where
    I: IntoIterator<Item = Scoped<R>>,
    R: Resource,
    F: FnOnce(Vec<R::Acquired>) -> Result<T, ScopeError<R::Error>>,
{
    let mut rest = resources.into_iter().peekable();
    if rest.peek().is_none() {
        #[cfg(feature = "tracing")]
        tracing::debug!("scope entered with no resources");
        return Err(UsageError::NoResources.into());
    }

    let (capacity, _) = rest.size_hint();
    nest(0, rest, Vec::with_capacity(capacity), block)
}

/// One level of the composition: scope the next entry, then recurse on
/// the rest from inside its continuation.
fn nest<I, R, T, F>(
    index: usize,
    mut rest: I,
    mut acquired: Vec<R::Acquired>,
    block: F,
) -> Result<T, ScopeError<R::Error>>
where
    I: Iterator<Item = Scoped<R>>,
    R: Resource,
    F: FnOnce(Vec<R::Acquired>) -> Result<T, ScopeError<R::Error>>,
{
    match rest.next() {
        None => block(acquired),
        Some(entry) => single::enter(index, entry, move |value| {
            acquired.push(value);
            nest(index + 1, rest, acquired, block)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::DynResource;
    use crate::testing::{Event, EventLog, Lock, MockResource};

    #[test]
    fn scope_all_acquires_in_order_and_releases_in_reverse() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log);
        let b = MockResource::new("b", &log);
        let c = MockResource::new("c", &log);

        let result = scope_all(
            vec![Scoped::managed(&a), Scoped::managed(&b), Scoped::managed(&c)],
            |values| Ok(values),
        );

        assert_eq!(
            result,
            Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(
            log.events(),
            vec![
                Event::Acquired("a"),
                Event::Acquired("b"),
                Event::Acquired("c"),
                Event::Released("c"),
                Event::Released("b"),
                Event::Released("a"),
            ]
        );
    }

    #[test]
    fn scope_all_rejects_empty_sequence() {
        let mut ran = false;
        let result = scope_all(Vec::<Scoped<&MockResource<'_>>>::new(), |_| {
            ran = true;
            Ok(())
        });

        assert_eq!(result, Err(ScopeError::Usage(UsageError::NoResources)));
        assert!(!ran);
    }

    #[test]
    fn partial_acquisition_releases_prefix_only() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log);
        let b = MockResource::new("b", &log);
        let c = MockResource::new("c", &log).fail_acquire("busy");
        let d = MockResource::new("d", &log);
        let mut ran = false;

        let result = scope_all(
            vec![
                Scoped::managed(&a),
                Scoped::managed(&b),
                Scoped::managed(&c),
                Scoped::managed(&d),
            ],
            |_| {
                ran = true;
                Ok(())
            },
        );

        assert_eq!(
            result,
            Err(ScopeError::Acquire {
                index: 2,
                error: "busy".to_string()
            })
        );
        assert!(!ran, "block must not run after a failed acquisition");
        assert_eq!(log.released(), vec!["b", "a"]);
        assert!(!d.is_held());
    }

    #[test]
    fn block_failure_releases_everything() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log);
        let b = MockResource::new("b", &log);

        let result: Result<(), _> = scope_all(vec![Scoped::managed(&a), Scoped::managed(&b)], |_| {
            Err("block failed".to_string())
        });

        assert_eq!(result, Err(ScopeError::Block("block failed".to_string())));
        assert_eq!(log.released(), vec!["b", "a"]);
    }

    #[test]
    fn outer_release_failure_chains_inner_release_failure() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log).fail_release("a stuck");
        let b = MockResource::new("b", &log).fail_release("b stuck");

        let result = scope_all(vec![Scoped::managed(&a), Scoped::managed(&b)], |_| Ok(()));

        let err = result.unwrap_err();
        assert_eq!(err.index(), Some(0));
        assert_eq!(err.release_error(), Some(&"a stuck".to_string()));

        let inner = err.superseded().unwrap();
        assert_eq!(inner.index(), Some(1));
        assert_eq!(inner.release_error(), Some(&"b stuck".to_string()));
        assert_eq!(inner.superseded(), None);
        assert_eq!(log.released(), vec!["b", "a"]);
    }

    #[test]
    fn release_failure_during_partial_acquisition_supersedes_it() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log).fail_release("a stuck");
        let b = MockResource::new("b", &log).fail_acquire("busy");

        let result = scope_all(vec![Scoped::managed(&a), Scoped::managed(&b)], |_| Ok(()));

        let err = result.unwrap_err();
        assert_eq!(err.release_error(), Some(&"a stuck".to_string()));
        assert_eq!(
            err.superseded(),
            Some(&ScopeError::Acquire {
                index: 1,
                error: "busy".to_string()
            })
        );
    }

    #[test]
    fn scope_seq_runs_non_empty_sequence() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log);
        let seq = ResourceSeq::new(Scoped::managed(&a), vec![Scoped::plain("p".to_string())]);

        let result = scope_seq(seq, |values| Ok(values.concat()));

        assert_eq!(result, Ok("ap".to_string()));
        assert_eq!(log.released(), vec!["a"]);
    }

    #[test]
    fn scope_exact_arity_mismatch_releases_resources() {
        let log = EventLog::new();
        let a = MockResource::new("a", &log);
        let b = MockResource::new("b", &log);
        let mut ran = false;

        let result = scope_exact(vec![Scoped::managed(&a), Scoped::managed(&b)], |[_]: [String; 1]| {
            ran = true;
            Ok(())
        });

        assert_eq!(
            result,
            Err(ScopeError::Arity {
                expected: 1,
                actual: 2
            })
        );
        assert!(!ran);
        assert_eq!(log.released(), vec!["b", "a"]);
    }

    #[test]
    fn scope_exact_empty_is_usage_error_not_arity() {
        let result = scope_exact(Vec::<Scoped<&MockResource<'_>>>::new(), |[]: [String; 0]| Ok(()));
        assert!(result.unwrap_err().is_usage());
    }

    #[test]
    fn mixed_resource_types_share_a_boxed_sequence() {
        let lock = Lock::new("l");
        let log = EventLog::new();
        let mock = MockResource::new("m", &log);
        let lock_name = crate::resource::from_fns(
            || lock.acquire().map(|l| l.name().to_string()).map_err(|e| e.to_string()),
            || lock.release().map_err(|e| e.to_string()),
        );

        let entries: Vec<Scoped<DynResource<'_, String, String>>> = vec![
            Scoped::boxed(lock_name),
            Scoped::plain("plain".to_string()),
            Scoped::boxed(&mock),
        ];

        let result = scope_all(entries, |values| {
            assert!(lock.is_held());
            Ok(values)
        });

        assert_eq!(
            result,
            Ok(vec!["l".to_string(), "plain".to_string(), "m".to_string()])
        );
        assert!(!lock.is_held());
        assert_eq!(log.released(), vec!["m"]);
    }
}
