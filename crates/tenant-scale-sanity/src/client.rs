//! The volume API the scenario drives, and the types crossing it.

use futures::future::BoxFuture;
use std::fmt;
use tenant_scale_core::{Classify, ErrorClass};

/// Metadata key carrying the bearer credential on every call.
pub const AUTHORIZATION: &str = "authorization";

/// A bearer token issued to one identity.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.0
    }

    /// The value sent under [`AUTHORIZATION`]: `"bearer <token>"`.
    pub fn authorization(&self) -> String {
        format!("bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// An error returned by the remote API.
///
/// The class is reported by the server, so callers never inspect the message
/// to decide what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{class}: {message}")]
pub struct ApiError {
    /// Structured kind of the failure.
    pub class: ErrorClass,
    /// Server-provided detail.
    pub message: String,
}

impl ApiError {
    /// Creates an error of `class`.
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    /// Shorthand for a [`ErrorClass::PermissionDenied`] error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::PermissionDenied, message)
    }

    /// Shorthand for a [`ErrorClass::NotFound`] error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, message)
    }
}

impl Classify for ApiError {
    fn class(&self) -> ErrorClass {
        self.class
    }
}

/// Requested properties of a new volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSpec {
    /// Size in bytes.
    pub size: u64,
    /// Number of replicas.
    pub ha_level: u32,
}

/// A volume create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVolume {
    pub name: String,
    pub spec: VolumeSpec,
}

/// A volume as returned by inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub spec: VolumeSpec,
    /// Subject of the identity that created the volume.
    pub owner: String,
    /// Nodes the volume is attached to; empty once fully detached.
    pub attached_on: Vec<String>,
}

impl Volume {
    /// Returns true while the volume is attached anywhere.
    pub fn is_attached(&self) -> bool {
        !self.attached_on.is_empty()
    }
}

/// Client for the volume service, called under a per-identity credential.
///
/// Implementations must report a permission denial as an [`ApiError`] of
/// class [`ErrorClass::PermissionDenied`].
pub trait VolumeClient: Send + Sync + 'static {
    /// Creates a volume and returns its id.
    fn create<'a>(
        &'a self,
        credential: &'a Credential,
        request: CreateVolume,
    ) -> BoxFuture<'a, Result<String, ApiError>>;

    /// Looks up a volume by id.
    fn inspect<'a>(
        &'a self,
        credential: &'a Credential,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Volume, ApiError>>;

    /// Deletes a volume by id.
    fn delete<'a>(
        &'a self,
        credential: &'a Credential,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), ApiError>>;
}
