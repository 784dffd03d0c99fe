//! Property-based tests for acquisition order and unwinding

use ensconce::testing::{EventLog, MockResource};
use ensconce::{scope_all, ScopeError, Scoped};
use proptest::prelude::*;

const NAMES: [&str; 8] = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];

fn resources(log: &EventLog, len: usize, fail_at: Option<usize>) -> Vec<MockResource<'_>> {
    (0..len)
        .map(|i| {
            let res = MockResource::new(NAMES[i], log);
            if fail_at == Some(i) {
                res.fail_acquire(format!("{} busy", NAMES[i]))
            } else {
                res
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_release_order_is_reverse_of_acquired_prefix(
        len in 1usize..=8,
        fail_seed in any::<prop::sample::Index>(),
        should_fail in any::<bool>(),
    ) {
        let fail_at = should_fail.then(|| fail_seed.index(len));
        let log = EventLog::new();
        let pool = resources(&log, len, fail_at);

        let result = scope_all(pool.iter().map(Scoped::managed), |values| Ok(values.len()));

        let acquired = log.acquired();
        let mut expected_release = acquired.clone();
        expected_release.reverse();
        prop_assert_eq!(log.released(), expected_release);

        match fail_at {
            None => {
                prop_assert_eq!(result, Ok(len));
                prop_assert_eq!(acquired, NAMES[..len].to_vec());
            }
            Some(k) => {
                prop_assert_eq!(
                    result,
                    Err(ScopeError::Acquire { index: k, error: format!("{} busy", NAMES[k]) })
                );
                prop_assert_eq!(acquired, NAMES[..k].to_vec());
            }
        }
    }

    #[test]
    fn prop_block_values_match_sequence_order(
        plain_mask in prop::collection::vec(any::<bool>(), 1..=8)
    ) {
        let log = EventLog::new();
        let pool = resources(&log, plain_mask.len(), None);

        let entries = pool.iter().zip(&plain_mask).enumerate().map(|(i, (res, &plain))| {
            if plain {
                Scoped::plain(format!("plain{}", i))
            } else {
                Scoped::managed(res)
            }
        });

        let result = scope_all(entries, |values| Ok(values));

        let expected: Vec<String> = plain_mask
            .iter()
            .enumerate()
            .map(|(i, &plain)| if plain { format!("plain{}", i) } else { NAMES[i].to_string() })
            .collect();
        prop_assert_eq!(result, Ok(expected));

        let managed = plain_mask.iter().filter(|&&plain| !plain).count();
        prop_assert_eq!(log.released().len(), managed);
    }

    #[test]
    fn prop_block_failure_releases_all(len in 1usize..=8) {
        let log = EventLog::new();
        let pool = resources(&log, len, None);

        let result: Result<(), _> = scope_all(pool.iter().map(Scoped::managed), |_| {
            Err("block failed".to_string())
        });

        prop_assert_eq!(result, Err(ScopeError::Block("block failed".to_string())));
        prop_assert_eq!(log.released().len(), len);
        prop_assert!(pool.iter().all(|r| !r.is_held()));
    }
}
