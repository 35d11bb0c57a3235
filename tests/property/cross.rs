//! Property tests for cross-check assignment.
//!
//! Invariants tested:
//! - No key is assigned its own entry
//! - Every entry is targeted exactly once (the assignment is a permutation)
//! - Assignment is deterministic for a given snapshot

use proptest::prelude::*;
use std::collections::BTreeSet;
use tenant_scale_core::Snapshot;
use tenant_scale_fanout::{cross_assign, FanOutError};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: for two or more keys the assignment is a derangement
    #[test]
    fn assignment_is_a_derangement(keys in prop::collection::btree_set(any::<u16>(), 2..64)) {
        let snapshot: Snapshot<u16, String> = keys.iter().map(|k| (*k, format!("vol-{k}"))).collect();
        let targets = cross_assign(&snapshot).unwrap();

        prop_assert_eq!(targets.len(), keys.len());
        let mut targeted = BTreeSet::new();
        for target in &targets {
            prop_assert_ne!(target.key, target.other_key);
            prop_assert_eq!(&target.other_value, &format!("vol-{}", target.other_key));
            targeted.insert(target.other_key);
        }
        prop_assert_eq!(targeted, keys);
        prop_assert_eq!(cross_assign(&snapshot).unwrap(), targets);
    }

    /// Property: a single key always fails with that key
    #[test]
    fn single_key_fails(key in any::<u16>()) {
        let snapshot: Snapshot<u16, ()> = [(key, ())].into_iter().collect();
        prop_assert_eq!(cross_assign(&snapshot).unwrap_err(), FanOutError::NoOtherKey { key });
    }
}
