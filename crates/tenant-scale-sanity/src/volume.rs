//! Volume operations composed from single API calls.

use crate::client::{ApiError, Credential, VolumeClient};
use tenant_scale_core::{Classify, ErrorClass};
use tenant_scale_poller::{BoundedPoller, PollError, Step};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Failure of one user's volume operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VolumeOpError {
    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Waiting for the volume to detach failed or timed out.
    #[error("waiting for detach: {0}")]
    Detach(#[source] PollError<ApiError>),
    /// No credential exists for the user.
    #[error("no credential for user {user}")]
    MissingCredential {
        /// The user that has no credential.
        user: String,
    },
}

impl Classify for VolumeOpError {
    fn class(&self) -> ErrorClass {
        match self {
            VolumeOpError::Api(err) => err.class(),
            VolumeOpError::Detach(err) => err.class(),
            VolumeOpError::MissingCredential { .. } => ErrorClass::Unauthenticated,
        }
    }
}

/// Waits for volume `id` to detach, then deletes it.
///
/// Every inspection runs under `credential`; an inspection error stops the
/// wait and is returned, so a caller without access to the volume sees the
/// denial of the inspect call and no delete is attempted.
pub async fn delete_volume<C>(
    client: &C,
    credential: &Credential,
    id: &str,
    poller: &BoundedPoller,
) -> Result<(), VolumeOpError>
where
    C: VolumeClient + ?Sized,
{
    let summary = poller
        .wait(|| async move {
            client
                .inspect(credential, id)
                .await
                .map(|volume| Step::continue_if(volume.is_attached()))
        })
        .await
        .map_err(VolumeOpError::Detach)?;

    #[cfg(feature = "tracing")]
    debug!(volume = %id, checks = summary.attempts, "Volume detached, deleting");
    #[cfg(not(feature = "tracing"))]
    let _ = summary;

    client.delete(credential, id).await?;
    Ok(())
}
