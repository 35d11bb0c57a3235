//! Poller metrics regression tests

use super::helpers::*;
use serial_test::serial;
use std::time::Duration;
use tenant_scale_poller::{BoundedPoller, PollerConfig, Step};

fn poller(name: &str, timeout_ms: u64) -> BoundedPoller {
    BoundedPoller::new(
        PollerConfig::builder()
            .name(name)
            .timeout(Duration::from_millis(timeout_ms))
            .period(Duration::from_millis(10))
            .build(),
    )
}

#[tokio::test]
#[serial]
async fn poller_metrics_exist() {
    init_recorder();

    let mut remaining = 2;
    let summary = poller("test_poller", 1_000)
        .wait(|| {
            remaining -= 1;
            let attached = remaining > 0;
            async move { Ok::<_, String>(Step::continue_if(attached)) }
        })
        .await
        .unwrap();
    assert_eq!(summary.attempts, 2);

    let metrics = capture();

    metrics.assert_counter_exists("poller_checks_total");
    metrics.assert_metric_has_label("poller_checks_total", "poller", "test_poller");
    assert_eq!(
        metrics.counter_value("poller_checks_total", &[("poller", "test_poller")]),
        2
    );

    metrics.assert_counter_exists("poller_results_total");
    metrics.assert_metric_has_label("poller_results_total", "poller", "test_poller");
    metrics.assert_metric_has_label("poller_results_total", "result", "done");
    assert_eq!(
        metrics.counter_value(
            "poller_results_total",
            &[("poller", "test_poller"), ("result", "done")]
        ),
        1
    );
}

#[tokio::test]
#[serial]
async fn poller_failed_and_timeout_labels() {
    init_recorder();

    let failed = poller("test_poller_failed", 1_000)
        .wait(|| async { Err::<Step, _>("inspect failed") })
        .await;
    assert!(failed.is_err());

    let timed_out = poller("test_poller_timeout", 30)
        .wait(|| async { Ok::<_, String>(Step::Continue) })
        .await;
    assert!(timed_out.unwrap_err().is_timeout());

    let metrics = capture();

    metrics.assert_metric_has_label("poller_results_total", "result", "failed");
    metrics.assert_metric_has_label("poller_results_total", "result", "timeout");
    assert_eq!(
        metrics.counter_value(
            "poller_results_total",
            &[("poller", "test_poller_timeout"), ("result", "timeout")]
        ),
        1
    );
    assert_eq!(
        metrics.counter_value(
            "poller_results_total",
            &[("poller", "test_poller_failed"), ("result", "failed")]
        ),
        1
    );
}
