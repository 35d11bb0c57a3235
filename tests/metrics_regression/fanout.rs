//! Fan-out metrics regression tests

use super::helpers::*;
use serial_test::serial;
use tenant_scale_core::ErrorClass;
use tenant_scale_fanout::{FanOut, FanOutConfig};

#[tokio::test]
#[serial]
async fn fanout_metrics_exist() {
    init_recorder();

    let fanout = FanOut::new(FanOutConfig::builder().name("test_fanout").build());
    let report = fanout
        .run(0..4u32, |key| async move {
            if key == 3 {
                Err(ErrorClass::NotFound)
            } else {
                Ok(key)
            }
        })
        .await
        .unwrap();
    assert!(!report.is_success());

    let metrics = capture();

    metrics.assert_counter_exists("fanout_workers_total");
    metrics.assert_metric_has_label("fanout_workers_total", "fanout", "test_fanout");
    metrics.assert_metric_has_label("fanout_workers_total", "outcome", "success");
    metrics.assert_metric_has_label("fanout_workers_total", "outcome", "failure");
    assert_eq!(
        metrics.counter_value(
            "fanout_workers_total",
            &[("fanout", "test_fanout"), ("outcome", "success")]
        ),
        3
    );
    assert_eq!(
        metrics.counter_value(
            "fanout_workers_total",
            &[("fanout", "test_fanout"), ("outcome", "failure")]
        ),
        1
    );

    metrics.assert_histogram_exists("fanout_round_duration_seconds");
    metrics.assert_metric_has_label("fanout_round_duration_seconds", "fanout", "test_fanout");
}

#[tokio::test]
#[serial]
async fn fanout_remapped_outcome_label() {
    init_recorder();

    let fanout = FanOut::new(
        FanOutConfig::builder()
            .name("test_fanout_denied")
            .expect_denied()
            .build(),
    );
    let report = fanout
        .run(["user0", "user1"], |_| async { Err::<(), _>(ErrorClass::PermissionDenied) })
        .await
        .unwrap();
    assert!(report.is_success());

    let metrics = capture();

    metrics.assert_metric_has_label("fanout_workers_total", "fanout", "test_fanout_denied");
    metrics.assert_metric_has_label("fanout_workers_total", "outcome", "remapped");
    assert_eq!(
        metrics.counter_value(
            "fanout_workers_total",
            &[("fanout", "test_fanout_denied"), ("outcome", "remapped")]
        ),
        2
    );
}

#[tokio::test]
#[serial]
async fn fanout_counts_are_per_round_between_captures() {
    init_recorder();

    let fanout = FanOut::new(FanOutConfig::builder().name("test_fanout_rounds").build());
    let labels = [("fanout", "test_fanout_rounds"), ("outcome", "success")];

    fanout
        .run(0..2u32, |key| async move { Ok::<_, ErrorClass>(key) })
        .await
        .unwrap();
    let first = capture();
    first.assert_counter_exists("fanout_workers_total");
    assert_eq!(first.counter_value("fanout_workers_total", &labels), 2);

    fanout
        .run(0..5u32, |key| async move { Ok::<_, ErrorClass>(key) })
        .await
        .unwrap();
    assert_eq!(capture().counter_value("fanout_workers_total", &labels), 5);
}
