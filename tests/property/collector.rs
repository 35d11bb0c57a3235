//! Property tests for the outcome collector.
//!
//! Invariants tested:
//! - drain_all succeeds exactly when no slot failed
//! - The aggregate names exactly the failed keys, in ascending order
//! - No outcome is dropped, including unpublished slots

use proptest::prelude::*;
use tenant_scale_core::{Cause, ErrorCollector};
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Ok,
    Err,
    Dropped,
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        4 => Just(Outcome::Ok),
        2 => Just(Outcome::Err),
        1 => Just(Outcome::Dropped),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the aggregate matches the set of non-ok outcomes
    #[test]
    fn aggregate_names_exactly_the_failed_keys(outcomes in prop::collection::vec(outcome(), 0..64)) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let collector: ErrorCollector<usize, String> = ErrorCollector::new();
            let mut handles = Vec::new();
            for (key, outcome) in outcomes.iter().enumerate() {
                let slot = collector.register(key).unwrap();
                let outcome = *outcome;
                handles.push(tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    match outcome {
                        Outcome::Ok => slot.publish(Ok(())),
                        Outcome::Err => slot.publish(Err(format!("worker {key} failed"))),
                        Outcome::Dropped => drop(slot),
                    }
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }

            let expected: Vec<usize> = outcomes
                .iter()
                .enumerate()
                .filter(|(_, o)| !matches!(o, Outcome::Ok))
                .map(|(key, _)| key)
                .collect();

            match collector.drain_all().await {
                Ok(()) => prop_assert!(expected.is_empty()),
                Err(err) => {
                    prop_assert_eq!(err.total(), outcomes.len());
                    prop_assert_eq!(err.keys().copied().collect::<Vec<_>>(), expected);
                    for failure in err.iter() {
                        let expect_unpublished = matches!(outcomes[*failure.key()], Outcome::Dropped);
                        prop_assert_eq!(failure.cause() == &Cause::Unpublished, expect_unpublished);
                    }
                }
            }
            Ok(())
        })?;
    }

    /// Property: registering a key twice is always rejected
    #[test]
    fn duplicate_registration_is_rejected(keys in prop::collection::vec(0u8..8, 1..32)) {
        let collector: ErrorCollector<u8, ()> = ErrorCollector::new();
        let mut seen = std::collections::HashSet::new();
        let mut slots = Vec::new();
        for key in keys {
            let result = collector.register(key);
            prop_assert_eq!(result.is_ok(), seen.insert(key));
            if let Ok(slot) = result {
                slots.push(slot);
            }
        }
        prop_assert_eq!(collector.len(), seen.len());
    }
}
