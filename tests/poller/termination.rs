use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tenant_scale_core::{Classify, ErrorClass};
use tenant_scale_poller::{BoundedPoller, PollError, PollerConfig, Step};

fn poller() -> BoundedPoller {
    BoundedPoller::new(
        PollerConfig::builder()
            .timeout(Duration::from_secs(10))
            .period(Duration::from_secs(1))
            .name("terminal")
            .build(),
    )
}

#[tokio::test(start_paused = true)]
async fn done_is_never_checked_again() {
    let calls = AtomicUsize::new(0);
    let summary = poller()
        .wait(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ErrorClass>(Step::Done) }
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(summary.attempts, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn check_error_is_propagated_immediately() {
    let calls = AtomicUsize::new(0);
    let err = poller()
        .wait(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Step, _>(ErrorClass::PermissionDenied) }
        })
        .await
        .unwrap_err();

    assert_eq!(err, PollError::Failed(ErrorClass::PermissionDenied));
    assert!(err.is_permission_denied());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_is_classified_as_deadline_exceeded() {
    let err = poller()
        .wait(|| async { Ok::<_, ErrorClass>(Step::Continue) })
        .await
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::DeadlineExceeded);
    assert!(err.to_string().contains("terminal"));
}

#[tokio::test(start_paused = true)]
async fn callbacks_report_terminal_state() {
    let done = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let d = Arc::clone(&done);
    let f = Arc::clone(&failed);

    let poller = BoundedPoller::new(
        PollerConfig::builder()
            .on_done(move |attempts, _| {
                d.store(attempts, Ordering::SeqCst);
            })
            .on_failed(move |attempts| {
                f.store(attempts, Ordering::SeqCst);
            })
            .build(),
    );

    let mut n = 0;
    poller
        .wait(|| {
            n += 1;
            let step = Step::continue_if(n < 2);
            async move { Ok::<_, ErrorClass>(step) }
        })
        .await
        .unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 2);

    let _ = poller
        .wait(|| async { Err::<Step, _>(ErrorClass::Unavailable) })
        .await;
    assert_eq!(failed.load(Ordering::SeqCst), 1);
}
