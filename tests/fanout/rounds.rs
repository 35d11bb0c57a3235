use super::TestError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tenant_scale_core::{Cause, ErrorClass};
use tenant_scale_fanout::{FanOut, FanOutConfig};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_key_publishes_before_the_round_returns() {
    for n in [0usize, 1, 2, 17, 128] {
        let finished = Arc::new(AtomicUsize::new(0));
        let fanout = FanOut::new(FanOutConfig::builder().name("publish").build());

        let f = Arc::clone(&finished);
        let report = fanout
            .run(0..n, move |i| {
                let f = Arc::clone(&f);
                async move {
                    tokio::time::sleep(Duration::from_millis((i % 7) as u64)).await;
                    f.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>(i)
                }
            })
            .await
            .unwrap();

        assert_eq!(report.workers(), n);
        assert_eq!(finished.load(Ordering::SeqCst), n);
        assert_eq!(report.values().len(), n);
        assert!(report.is_success());
    }
}

#[tokio::test]
async fn single_failure_names_only_its_key() {
    let fanout = FanOut::new(FanOutConfig::builder().build());
    let report = fanout
        .run(["user0", "user1", "user2", "user3"], |user| async move {
            if user == "user2" {
                Err(TestError::new(ErrorClass::NotFound, "volume vol-7 not found"))
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

    let failures = report.failures().unwrap();
    let message = failures.to_string();
    assert!(message.contains("user2"));
    assert!(message.contains("volume vol-7 not found"));
    for other in ["user0", "user1", "user3"] {
        assert!(!message.contains(other), "{other} must not be reported");
    }
}

#[tokio::test]
async fn failures_do_not_cancel_siblings() {
    let started = Arc::new(Mutex::new(HashSet::new()));
    let fanout = FanOut::new(FanOutConfig::builder().build());

    let s = Arc::clone(&started);
    let report = fanout
        .run(0..10u32, move |i| {
            let s = Arc::clone(&s);
            async move {
                s.lock().unwrap().insert(i);
                if i % 3 == 0 {
                    return Err(TestError::new(ErrorClass::Unavailable, "backend down"));
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(i)
            }
        })
        .await
        .unwrap();

    assert_eq!(started.lock().unwrap().len(), 10);
    let failures = report.failures().unwrap();
    assert_eq!(failures.keys().copied().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
    assert_eq!(report.values().len(), 6);
}

#[tokio::test]
async fn values_are_recorded_before_outcomes() {
    let fanout = FanOut::new(FanOutConfig::builder().build());
    let report = fanout
        .run(["a", "b"], |key| async move {
            tokio::task::yield_now().await;
            Ok::<_, TestError>(key.to_uppercase())
        })
        .await
        .unwrap();

    let values = report.into_result().unwrap();
    assert_eq!(values.get(&"a"), Some(&"A".to_string()));
    assert_eq!(values.get(&"b"), Some(&"B".to_string()));
}

#[tokio::test]
async fn panicking_worker_does_not_lose_its_outcome() {
    let fanout = FanOut::new(FanOutConfig::builder().build());
    let report = fanout
        .run(0..4u32, |i| async move {
            if i == 2 {
                panic!("unit of work panicked");
            }
            Ok::<_, TestError>(())
        })
        .await
        .unwrap();

    let failures = report.failures().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures.total(), 4);
    assert_eq!(failures.failure_for(&2).unwrap().cause(), &Cause::Unpublished);
}

#[tokio::test]
async fn callbacks_see_every_worker() {
    let successes = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&successes);
    let f = Arc::clone(&failures);

    let fanout = FanOut::new(
        FanOutConfig::builder()
            .name("callbacks")
            .on_worker_success(move |_, _| {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_worker_failure(move |key, _| {
                assert_eq!(key, "3");
                f.fetch_add(1, Ordering::SeqCst);
            })
            .build(),
    );

    fanout
        .run(0..5u32, |i| async move {
            if i == 3 {
                Err(TestError::new(ErrorClass::Other, "boom"))
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

    assert_eq!(successes.load(Ordering::SeqCst), 4);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn service_units_of_work() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let service = tower::service_fn(move |user: String| {
        c.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, TestError>(format!("vol-{user}")) }
    });

    let fanout = FanOut::new(FanOutConfig::builder().build());
    let users: Vec<String> = (0..8).map(|i| format!("user{i}")).collect();
    let report = fanout.run_service(users, service).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 8);
    assert_eq!(
        report.values().get("user5").map(String::as_str),
        Some("vol-user5")
    );
}
