//! An in-process volume service for running scenarios without a cluster.

use crate::client::{ApiError, CreateVolume, Credential, Volume, VolumeClient, AUTHORIZATION};
use crate::identity::{Claims, TokenMinter, ADMIN_ROLE};
use futures::future::BoxFuture;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tenant_scale_core::ErrorClass;

const NODE: &str = "node-0";

/// In-memory [`VolumeClient`] that enforces per-identity ownership.
///
/// Tokens are minted by the service itself through [`TokenMinter`]. A caller
/// may act on a volume it created, or on any volume if its claims carry the
/// admin role. Unknown and expired tokens are rejected as
/// `Unauthenticated`, foreign volumes as `PermissionDenied`.
///
/// New volumes can be made to report as attached for a number of
/// inspections, and deleting an attached volume fails with
/// `FailedPrecondition`.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct InMemoryVolumes {
    inner: Arc<Inner>,
}

struct Inner {
    latency: Option<Duration>,
    attached_for: usize,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    tokens: HashMap<String, Claims>,
    volumes: HashMap<String, Stored>,
    failures: HashMap<String, ApiError>,
    next_id: u64,
}

struct Stored {
    volume: Volume,
    attached_checks: usize,
}

impl InMemoryVolumes {
    /// Creates a service with no latency and detached volumes.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder.
    pub fn builder() -> InMemoryVolumesBuilder {
        InMemoryVolumesBuilder::new()
    }

    /// Registers `claims` and returns a credential for them.
    pub fn issue(&self, claims: Claims) -> Credential {
        let mut state = self.inner.state.lock();
        Credential::new(state.insert_token(claims))
    }

    /// Makes every later inspect or delete of volume `id` fail with `error`.
    pub fn fail_volume(&self, id: impl Into<String>, error: ApiError) {
        self.inner.state.lock().failures.insert(id.into(), error);
    }

    /// Returns true if volume `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.state.lock().volumes.contains_key(id)
    }

    /// Number of existing volumes.
    pub fn volume_count(&self) -> usize {
        self.inner.state.lock().volumes.len()
    }

    /// The subject that owns volume `id`.
    pub fn owner_of(&self, id: &str) -> Option<String> {
        self.inner
            .state
            .lock()
            .volumes
            .get(id)
            .map(|stored| stored.volume.owner.clone())
    }

    async fn delay(&self) {
        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn create_now(&self, credential: &Credential, request: CreateVolume) -> Result<String, ApiError> {
        let mut state = self.inner.state.lock();
        let claims = state.authenticate(credential)?;

        state.next_id += 1;
        let id = format!("vol-{:04}", state.next_id);
        let volume = Volume {
            id: id.clone(),
            name: request.name,
            spec: request.spec,
            owner: claims.subject,
            attached_on: Vec::new(),
        };
        state.volumes.insert(
            id.clone(),
            Stored {
                volume,
                attached_checks: self.inner.attached_for,
            },
        );
        Ok(id)
    }

    fn inspect_now(&self, credential: &Credential, id: &str) -> Result<Volume, ApiError> {
        let mut state = self.inner.state.lock();
        state.authorize(credential, id)?;

        let stored = state
            .volumes
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(format!("volume {id} not found")))?;
        let mut volume = stored.volume.clone();
        if stored.attached_checks > 0 {
            stored.attached_checks -= 1;
            volume.attached_on.push(NODE.to_string());
        }
        Ok(volume)
    }

    fn delete_now(&self, credential: &Credential, id: &str) -> Result<(), ApiError> {
        let mut state = self.inner.state.lock();
        state.authorize(credential, id)?;

        if state
            .volumes
            .get(id)
            .is_some_and(|stored| stored.attached_checks > 0)
        {
            return Err(ApiError::new(
                ErrorClass::FailedPrecondition,
                format!("volume {id} is still attached on {NODE}"),
            ));
        }
        state.volumes.remove(id);
        Ok(())
    }
}

impl State {
    fn insert_token(&mut self, claims: Claims) -> String {
        let token = format!("tok-{}-{}", self.tokens.len(), claims.subject);
        self.tokens.insert(token.clone(), claims);
        token
    }

    fn authenticate(&self, credential: &Credential) -> Result<Claims, ApiError> {
        let header = credential.authorization();
        let token = header
            .strip_prefix("bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::new(
                    ErrorClass::Unauthenticated,
                    format!("malformed {AUTHORIZATION} metadata"),
                )
            })?;
        let claims = self
            .tokens
            .get(token)
            .ok_or_else(|| ApiError::new(ErrorClass::Unauthenticated, "unknown token"))?;
        if claims.is_expired_at(SystemTime::now()) {
            return Err(ApiError::new(ErrorClass::Unauthenticated, "token expired"));
        }
        Ok(claims.clone())
    }

    /// Checks that the caller may act on an existing volume `id`.
    fn authorize(&self, credential: &Credential, id: &str) -> Result<(), ApiError> {
        let claims = self.authenticate(credential)?;
        let stored = self
            .volumes
            .get(id)
            .ok_or_else(|| ApiError::not_found(format!("volume {id} not found")))?;
        if let Some(error) = self.failures.get(id) {
            return Err(error.clone());
        }
        if stored.volume.owner != claims.subject && !claims.has_role(ADMIN_ROLE) {
            return Err(ApiError::permission_denied(format!(
                "{} may not access volume {id}",
                claims.subject
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryVolumes {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenMinter for InMemoryVolumes {
    fn mint(&self, claims: &Claims) -> Result<String, ApiError> {
        Ok(self.inner.state.lock().insert_token(claims.clone()))
    }
}

impl VolumeClient for InMemoryVolumes {
    fn create<'a>(
        &'a self,
        credential: &'a Credential,
        request: CreateVolume,
    ) -> BoxFuture<'a, Result<String, ApiError>> {
        Box::pin(async move {
            self.delay().await;
            self.create_now(credential, request)
        })
    }

    fn inspect<'a>(
        &'a self,
        credential: &'a Credential,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Volume, ApiError>> {
        Box::pin(async move {
            self.delay().await;
            self.inspect_now(credential, id)
        })
    }

    fn delete<'a>(
        &'a self,
        credential: &'a Credential,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            self.delay().await;
            self.delete_now(credential, id)
        })
    }
}

/// Builder for [`InMemoryVolumes`].
pub struct InMemoryVolumesBuilder {
    latency: Option<Duration>,
    attached_for: usize,
}

impl InMemoryVolumesBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            latency: None,
            attached_for: 0,
        }
    }

    /// Delays every call by `latency`.
    ///
    /// Default: no delay
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reports new volumes as attached for their first `inspections`
    /// authorized inspections.
    ///
    /// Default: 0
    pub fn attached_for(mut self, inspections: usize) -> Self {
        self.attached_for = inspections;
        self
    }

    /// Builds the service.
    pub fn build(self) -> InMemoryVolumes {
        InMemoryVolumes {
            inner: Arc::new(Inner {
                latency: self.latency,
                attached_for: self.attached_for,
                state: Mutex::new(State::default()),
            }),
        }
    }
}

impl Default for InMemoryVolumesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
