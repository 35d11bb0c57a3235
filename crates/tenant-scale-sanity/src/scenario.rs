//! The security scale scenario.
//!
//! Every identity creates its own volume, then the scenario checks that each
//! identity can reach its own volume and is refused on its neighbour's. The
//! rounds run strictly one after another; each round's workers read the
//! user → volume snapshot produced by the create round.

use crate::client::{ApiError, CreateVolume, Credential, VolumeClient, VolumeSpec};
use crate::config::ScaleConfig;
use crate::error::ScaleError;
use crate::identity::{Identities, TokenMinter};
use crate::volume::{delete_volume, VolumeOpError};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tenant_scale_core::Snapshot;
use tenant_scale_fanout::{FanOut, FanOutConfig, OutcomePolicy, RoundReport};
use tenant_scale_poller::{BoundedPoller, PollerConfig};

#[cfg(feature = "tracing")]
use tracing::info;

/// One round of the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Round {
    /// Each identity creates and inspects one volume.
    CreateVolumes,
    /// Each identity inspects its own volume.
    InspectOwn,
    /// Each identity inspects a neighbour's volume and must be refused.
    InspectOthers,
    /// Each identity tries to delete a neighbour's volume and must be refused.
    DeleteOthers,
    /// Each identity deletes its own volume once it has detached.
    DeleteOwn,
}

impl Round {
    /// Every round, in execution order.
    pub const ALL: [Round; 5] = [
        Round::CreateVolumes,
        Round::InspectOwn,
        Round::InspectOthers,
        Round::DeleteOthers,
        Round::DeleteOwn,
    ];

    /// Stable name used in fan-out instance names and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Round::CreateVolumes => "create_volumes",
            Round::InspectOwn => "inspect_own",
            Round::InspectOthers => "inspect_others",
            Round::DeleteOthers => "delete_others",
            Round::DeleteOwn => "delete_own",
        }
    }

    /// The outcome policy of this round.
    pub fn policy(&self) -> OutcomePolicy {
        match self {
            Round::InspectOthers | Round::DeleteOthers => OutcomePolicy::ExpectDenied,
            Round::CreateVolumes | Round::InspectOwn | Round::DeleteOwn => OutcomePolicy::Strict,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one successful round did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: Round,
    /// Number of workers spawned.
    pub workers: usize,
    /// Number of permission denials counted as success.
    pub remapped: usize,
    pub elapsed: Duration,
}

/// Summaries of every round of a completed run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleSummary {
    pub rounds: Vec<RoundSummary>,
}

impl ScaleSummary {
    /// The summary of `round`, if it ran.
    pub fn round(&self, round: Round) -> Option<&RoundSummary> {
        self.rounds.iter().find(|summary| summary.round == round)
    }

    /// Combined wall time of all rounds.
    pub fn elapsed(&self) -> Duration {
        self.rounds.iter().map(|summary| summary.elapsed).sum()
    }
}

/// Runs the security scale rounds against a [`VolumeClient`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tenant_scale_sanity::{InMemoryVolumes, ScaleConfig, SecurityScale};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let volumes = Arc::new(InMemoryVolumes::new());
/// let config = ScaleConfig::builder().users(4).build();
///
/// let mut scale = SecurityScale::with_generated_identities(config, volumes).await.unwrap();
/// let summary = scale.run().await.unwrap();
///
/// assert_eq!(summary.rounds.len(), 5);
/// # }
/// ```
pub struct SecurityScale<C> {
    config: Arc<ScaleConfig>,
    client: Arc<C>,
    identities: Identities,
    poller: BoundedPoller,
    volumes: Option<Snapshot<String, String>>,
}

impl<C: VolumeClient> SecurityScale<C> {
    /// Creates a scenario for pre-generated `identities`.
    pub fn new(config: ScaleConfig, client: Arc<C>, identities: Identities) -> Self {
        let poller = BoundedPoller::new(
            PollerConfig::builder()
                .name(format!("{}.detach", config.name))
                .timeout(config.detach_timeout)
                .period(config.detach_period)
                .build(),
        );
        Self {
            config: Arc::new(config),
            client,
            identities,
            poller,
            volumes: None,
        }
    }

    /// Creates a scenario whose identities are minted by the client itself.
    pub async fn with_generated_identities(
        config: ScaleConfig,
        client: Arc<C>,
    ) -> Result<Self, ScaleError>
    where
        C: TokenMinter,
    {
        let identities =
            Identities::generate(&config.user_prefix, config.users, Arc::clone(&client)).await?;
        Ok(Self::new(config, client, identities))
    }

    /// The identities the rounds act as.
    pub fn identities(&self) -> &Identities {
        &self.identities
    }

    /// User → volume id, once the create round has run.
    pub fn volumes(&self) -> Option<&Snapshot<String, String>> {
        self.volumes.as_ref()
    }

    /// Runs every round in order, stopping at the first failed round.
    pub async fn run(&mut self) -> Result<ScaleSummary, ScaleError> {
        let mut summary = ScaleSummary::default();
        summary.rounds.push(self.create_volumes().await?);
        summary.rounds.push(self.inspect_own().await?);
        summary.rounds.push(self.inspect_others().await?);
        summary.rounds.push(self.delete_others().await?);
        summary.rounds.push(self.delete_own().await?);

        #[cfg(feature = "tracing")]
        info!(
            scale = %self.config.name,
            users = self.identities.len(),
            elapsed_ms = summary.elapsed().as_millis() as u64,
            "Security scale completed"
        );

        Ok(summary)
    }

    /// Every identity creates a volume named `sdk-vol-<unix secs>-<user>` and
    /// inspects it.
    ///
    /// The volumes that were created are recorded even if the round fails.
    pub async fn create_volumes(&mut self) -> Result<RoundSummary, ScaleError> {
        let round = Round::CreateVolumes;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let spec = VolumeSpec {
            size: self.config.volume_size,
            ha_level: self.config.ha_level,
        };
        let users: Vec<String> = self.identities.names().cloned().collect();

        let report = self
            .fanout(round)
            .run(users, |user| {
                let client = Arc::clone(&self.client);
                let credential = credential_of(&self.identities, &user);
                let request = CreateVolume {
                    name: format!("sdk-vol-{stamp}-{user}"),
                    spec,
                };
                async move {
                    let credential = credential?;
                    let id = client.create(&credential, request).await?;
                    let volume = client.inspect(&credential, &id).await?;
                    Ok::<_, VolumeOpError>(volume.id)
                }
            })
            .await?;

        self.volumes = Some(report.values().clone());
        finish(round, report)
    }

    /// Every identity inspects its own volume.
    pub async fn inspect_own(&self) -> Result<RoundSummary, ScaleError> {
        let round = Round::InspectOwn;
        let owned = self.owned(round)?;

        let report = self
            .fanout(round)
            .run(owned.keys().cloned().collect::<Vec<_>>(), |user| {
                let client = Arc::clone(&self.client);
                let credential = credential_of(&self.identities, &user);
                let id = volume_of(owned, &user);
                async move {
                    let (credential, id) = (credential?, id?);
                    client.inspect(&credential, &id).await?;
                    Ok::<_, VolumeOpError>(())
                }
            })
            .await?;

        finish(round, report)
    }

    /// Every identity inspects its neighbour's volume; a denial is success.
    pub async fn inspect_others(&self) -> Result<RoundSummary, ScaleError> {
        let round = Round::InspectOthers;
        let owned = self.owned(round)?;

        let report = self
            .fanout(round)
            .run_cross(owned, |target| {
                let client = Arc::clone(&self.client);
                let credential = credential_of(&self.identities, &target.key);
                async move {
                    let credential = credential?;
                    client.inspect(&credential, &target.other_value).await?;
                    Ok::<_, VolumeOpError>(())
                }
            })
            .await?;

        finish(round, report)
    }

    /// Every identity tries to delete its neighbour's volume; a denial is
    /// success.
    pub async fn delete_others(&self) -> Result<RoundSummary, ScaleError> {
        let round = Round::DeleteOthers;
        let owned = self.owned(round)?;

        let report = self
            .fanout(round)
            .run_cross(owned, |target| {
                let client = Arc::clone(&self.client);
                let credential = credential_of(&self.identities, &target.key);
                let poller = self.poller.clone();
                async move {
                    let credential = credential?;
                    delete_volume(&*client, &credential, &target.other_value, &poller).await
                }
            })
            .await?;

        finish(round, report)
    }

    /// Every identity deletes its own volume after it has detached.
    pub async fn delete_own(&self) -> Result<RoundSummary, ScaleError> {
        let round = Round::DeleteOwn;
        let owned = self.owned(round)?;

        let report = self
            .fanout(round)
            .run(owned.keys().cloned().collect::<Vec<_>>(), |user| {
                let client = Arc::clone(&self.client);
                let credential = credential_of(&self.identities, &user);
                let id = volume_of(owned, &user);
                let poller = self.poller.clone();
                async move {
                    let (credential, id) = (credential?, id?);
                    delete_volume(&*client, &credential, &id, &poller).await
                }
            })
            .await?;

        finish(round, report)
    }

    fn fanout(&self, round: Round) -> FanOut {
        FanOut::new(
            FanOutConfig::builder()
                .name(format!("{}.{}", self.config.name, round))
                .policy(round.policy())
                .build(),
        )
    }

    fn owned(&self, round: Round) -> Result<&Snapshot<String, String>, ScaleError> {
        self.volumes.as_ref().ok_or(ScaleError::NoVolumes(round))
    }
}

impl<C> fmt::Debug for SecurityScale<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityScale")
            .field("name", &self.config.name)
            .field("identities", &self.identities.len())
            .field("volumes", &self.volumes.as_ref().map(Snapshot::len))
            .finish()
    }
}

fn credential_of(identities: &Identities, user: &str) -> Result<Credential, VolumeOpError> {
    identities
        .get(user)
        .cloned()
        .ok_or_else(|| VolumeOpError::MissingCredential {
            user: user.to_string(),
        })
}

fn volume_of(owned: &Snapshot<String, String>, user: &str) -> Result<String, VolumeOpError> {
    owned
        .get(user)
        .cloned()
        .ok_or_else(|| VolumeOpError::Api(ApiError::not_found(format!("no volume recorded for {user}"))))
}

fn finish<V>(
    round: Round,
    report: RoundReport<String, V, VolumeOpError>,
) -> Result<RoundSummary, ScaleError> {
    let summary = RoundSummary {
        round,
        workers: report.workers(),
        remapped: report.remapped().len(),
        elapsed: report.elapsed(),
    };

    #[cfg(feature = "tracing")]
    info!(
        round = %round,
        workers = summary.workers,
        remapped = summary.remapped,
        success = report.is_success(),
        "Round finished"
    );

    match report.into_result() {
        Ok(_) => Ok(summary),
        Err(source) => Err(ScaleError::Volumes { round, source }),
    }
}
