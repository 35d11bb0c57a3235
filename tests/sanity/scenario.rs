use super::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tenant_scale_sanity::{
    Claims, Identities, InMemoryVolumes, Round, ScaleConfig, ScaleError, SecurityScale,
    TokenMinter,
};

fn config(users: usize) -> ScaleConfig {
    ScaleConfig::builder()
        .users(users)
        .detach_timeout(Duration::from_secs(20))
        .detach_period(Duration::from_secs(1))
        .build()
}

#[tokio::test(start_paused = true)]
async fn default_sized_run_cleans_up() {
    init_tracing();
    let volumes = Arc::new(
        InMemoryVolumes::builder()
            .attached_for(3)
            .latency(Duration::from_millis(20))
            .build(),
    );
    let mut scale = SecurityScale::with_generated_identities(
        ScaleConfig::builder().build(),
        Arc::clone(&volumes),
    )
    .await
    .unwrap();
    assert_eq!(scale.identities().len(), 30);

    let summary = scale.run().await.unwrap();

    assert_eq!(summary.rounds.len(), Round::ALL.len());
    for round in &summary.rounds {
        assert_eq!(round.workers, 30, "{}", round.round);
    }
    assert_eq!(summary.round(Round::InspectOthers).unwrap().remapped, 30);
    assert_eq!(summary.round(Round::DeleteOthers).unwrap().remapped, 30);
    assert_eq!(volumes.volume_count(), 0);
}

#[tokio::test]
async fn volume_names_carry_the_user() {
    let volumes = Arc::new(InMemoryVolumes::new());
    let mut scale = SecurityScale::with_generated_identities(config(4), Arc::clone(&volumes))
        .await
        .unwrap();
    scale.create_volumes().await.unwrap();

    let credential = scale.identities().get("scaleUsers2").unwrap().clone();
    let id = scale.volumes().unwrap().get("scaleUsers2").unwrap().clone();
    let volume = tenant_scale_sanity::VolumeClient::inspect(&*volumes, &credential, &id)
        .await
        .unwrap();

    assert!(volume.name.starts_with("sdk-vol-"));
    assert!(volume.name.ends_with("-scaleUsers2"));
    assert_eq!(volume.spec.size, 5 * 1024 * 1024 * 1024);
    assert_eq!(volume.spec.ha_level, 2);
}

#[tokio::test(start_paused = true)]
async fn detach_timeout_fails_the_delete_round() {
    let volumes = Arc::new(InMemoryVolumes::builder().attached_for(usize::MAX).build());
    let mut scale = SecurityScale::with_generated_identities(config(3), Arc::clone(&volumes))
        .await
        .unwrap();

    let err = scale.run().await.unwrap_err();
    match &err {
        ScaleError::Volumes { round, source } => {
            assert_eq!(*round, Round::DeleteOwn);
            assert_eq!(source.len(), 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("timed out"));
    assert_eq!(volumes.volume_count(), 3);
}

#[tokio::test]
async fn expired_identities_fail_the_create_round() {
    let volumes = Arc::new(InMemoryVolumes::new());
    let mut claims = Claims::scale_user("stale", "example.com");
    claims.expires_at = std::time::SystemTime::UNIX_EPOCH;
    let stale = volumes.issue(claims);
    let fresh = volumes
        .mint(&Claims::scale_user("fresh", "example.com"))
        .map(tenant_scale_sanity::Credential::new)
        .unwrap();

    let identities: Identities = [("stale".to_string(), stale), ("fresh".to_string(), fresh)]
        .into_iter()
        .collect();
    let mut scale = SecurityScale::new(config(2), volumes, identities);

    let err = scale.create_volumes().await.unwrap_err();
    let failures = err.volume_failures().unwrap();
    assert_eq!(failures.keys().collect::<Vec<_>>(), [&"stale".to_string()]);
    assert_eq!(scale.volumes().unwrap().len(), 1);
}
