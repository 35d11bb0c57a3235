//! Property tests for the keyed store.
//!
//! Invariants tested:
//! - Concurrent puts of distinct keys are all visible in the snapshot
//! - The snapshot iterates in ascending key order
//! - The last put for a key wins

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tenant_scale_core::KeyedStore;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: W concurrent writers with distinct keys produce exactly W pairs
    #[test]
    fn concurrent_puts_are_all_visible(keys in prop::collection::hash_set(any::<u32>(), 0..200)) {
        let store = Arc::new(KeyedStore::new());
        let keys: Vec<u32> = keys.into_iter().collect();

        std::thread::scope(|scope| {
            for chunk in keys.chunks(16) {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for &key in chunk {
                        store.put(key, u64::from(key) * 3);
                    }
                });
            }
        });

        let snapshot = store.snapshot();
        prop_assert_eq!(snapshot.len(), keys.len());
        for key in &keys {
            prop_assert_eq!(snapshot.get(key), Some(&(u64::from(*key) * 3)));
        }
    }

    /// Property: snapshot order is ascending regardless of insertion order
    #[test]
    fn snapshot_is_ordered(keys in prop::collection::vec(any::<i64>(), 0..100)) {
        let store = KeyedStore::new();
        for key in &keys {
            store.put(*key, ());
        }

        let ordered: Vec<i64> = store.snapshot().keys().copied().collect();
        let mut expected: Vec<i64> = keys.iter().copied().collect::<HashSet<_>>().into_iter().collect();
        expected.sort();
        prop_assert_eq!(ordered, expected);
    }

    /// Property: the store agrees with a sequential model
    #[test]
    fn last_write_wins(ops in prop::collection::vec((0u8..16, any::<u16>()), 0..200)) {
        let store = KeyedStore::new();
        let mut model = BTreeMap::new();
        for (key, value) in ops {
            store.put(key, value);
            model.insert(key, value);
        }
        prop_assert_eq!(store.snapshot().into_inner(), model);
    }
}
