//! Scenario-level errors.

use crate::client::ApiError;
use crate::scenario::Round;
use crate::volume::VolumeOpError;
use tenant_scale_core::AggregateError;
use tenant_scale_fanout::FanOutError;

/// Why a scale scenario stopped.
#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    /// A round could not be started.
    #[error(transparent)]
    Orchestration(#[from] FanOutError<String>),
    /// At least one worker of a volume round failed.
    #[error("round {round} failed: {source}")]
    Volumes {
        /// The round that failed.
        round: Round,
        /// Every failed user of that round.
        source: AggregateError<String, VolumeOpError>,
    },
    /// Minting credentials failed for at least one identity.
    #[error("failed to create identities: {0}")]
    Identities(#[source] AggregateError<String, ApiError>),
    /// A round that needs volumes ran before any were created.
    #[error("round {0} needs the volumes of a create round")]
    NoVolumes(Round),
}

impl ScaleError {
    /// The per-user failures of a failed volume round, if that is what this is.
    pub fn volume_failures(&self) -> Option<&AggregateError<String, VolumeOpError>> {
        match self {
            ScaleError::Volumes { source, .. } => Some(source),
            _ => None,
        }
    }
}
