//! Multi-tenant security scale scenario.
//!
//! Drives a volume service with many identities at once and checks tenant
//! isolation under load:
//!
//! 1. [`Identities::generate`] mints one credential per scale user in parallel
//! 2. [`SecurityScale`] runs its rounds one after another, each a parallel
//!    fan-out with one worker per user
//! 3. Cross rounds point every user at a neighbour's volume and expect
//!    `PermissionDenied`
//! 4. Deletes wait for the volume to detach through a bounded poller
//!
//! [`InMemoryVolumes`] is an in-process [`VolumeClient`] for running the
//! scenario without a cluster.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tenant_scale_sanity::{InMemoryVolumes, Round, ScaleConfig, SecurityScale};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let volumes = Arc::new(InMemoryVolumes::new());
//! let config = ScaleConfig::builder().users(3).build();
//! let mut scale = SecurityScale::with_generated_identities(config, volumes).await.unwrap();
//!
//! scale.create_volumes().await.unwrap();
//! let refused = scale.inspect_others().await.unwrap();
//! assert_eq!(refused.round, Round::InspectOthers);
//! assert_eq!(refused.remapped, 3);
//! # }
//! ```

mod client;
mod config;
mod error;
mod identity;
mod memory;
mod scenario;
mod volume;

pub use client::{
    ApiError, CreateVolume, Credential, Volume, VolumeClient, VolumeSpec, AUTHORIZATION,
};
pub use config::{ScaleConfig, ScaleConfigBuilder};
pub use error::ScaleError;
pub use identity::{
    Claims, Identities, TokenMinter, ADMIN_ROLE, DEFAULT_EMAIL_DOMAIN, USER_GROUP, USER_ROLE,
};
pub use memory::{InMemoryVolumes, InMemoryVolumesBuilder};
pub use scenario::{Round, RoundSummary, ScaleSummary, SecurityScale};
pub use volume::{delete_volume, VolumeOpError};
