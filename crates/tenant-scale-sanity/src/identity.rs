//! Scale identities and the credentials they act with.

use crate::client::{ApiError, Credential};
use crate::error::ScaleError;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tenant_scale_core::Snapshot;
use tenant_scale_fanout::{FanOut, FanOutConfig};

#[cfg(feature = "tracing")]
use tracing::info;

/// Role granted to every scale identity.
pub const USER_ROLE: &str = "system.user";

/// Role allowed to act on any volume.
pub const ADMIN_ROLE: &str = "system.admin";

/// Group every scale identity belongs to.
pub const USER_GROUP: &str = "users";

/// Email domain of generated identities.
pub const DEFAULT_EMAIL_DOMAIN: &str = "portworx.com";

const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Claims carried by a minted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
    pub expires_at: SystemTime,
}

impl Claims {
    /// Claims of an ordinary scale user, valid for one hour.
    pub fn scale_user(name: &str, domain: &str) -> Self {
        Self {
            subject: name.to_string(),
            name: name.to_string(),
            email: format!("{name}@{domain}"),
            roles: vec![USER_ROLE.to_string()],
            groups: vec![USER_GROUP.to_string()],
            expires_at: SystemTime::now() + TOKEN_LIFETIME,
        }
    }

    /// Returns true if the claims grant `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns true if the claims have expired at `now`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

/// Issues bearer tokens for claims.
pub trait TokenMinter: Send + Sync + 'static {
    /// Signs `claims` into a token.
    fn mint(&self, claims: &Claims) -> Result<String, ApiError>;
}

/// Immutable map of identity name to credential.
///
/// Generated once per scenario and shared read-only by every round; clones
/// share the same map.
#[derive(Debug, Clone, Default)]
pub struct Identities {
    credentials: Arc<Snapshot<String, Credential>>,
}

impl Identities {
    /// Mints credentials for `<prefix>0` .. `<prefix><amount - 1>` in parallel.
    ///
    /// An `amount` of zero yields no identities. Every failed mint is
    /// reported in [`ScaleError::Identities`].
    ///
    /// # Panics
    ///
    /// Panics if called from outside a tokio runtime.
    pub async fn generate<M>(
        prefix: &str,
        amount: usize,
        minter: Arc<M>,
    ) -> Result<Self, ScaleError>
    where
        M: TokenMinter + ?Sized,
    {
        let fanout = FanOut::new(
            FanOutConfig::builder()
                .name(format!("{prefix}.identities"))
                .build(),
        );

        let names = (0..amount).map(|i| format!("{prefix}{i}"));
        let report = fanout
            .run(names, |name| {
                let minter = Arc::clone(&minter);
                async move {
                    let claims = Claims::scale_user(&name, DEFAULT_EMAIL_DOMAIN);
                    minter.mint(&claims).map(Credential::new)
                }
            })
            .await?;

        let credentials = report.into_result().map_err(ScaleError::Identities)?;

        #[cfg(feature = "tracing")]
        info!(prefix = %prefix, identities = credentials.len(), "Identities created");

        Ok(Self {
            credentials: Arc::new(credentials),
        })
    }

    /// The credential of `name`.
    pub fn get(&self, name: &str) -> Option<&Credential> {
        self.credentials.get(name)
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Returns true if there are no identities.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Identity names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.credentials.keys()
    }

    /// Identities and their credentials in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Credential)> {
        self.credentials.iter()
    }
}

impl FromIterator<(String, Credential)> for Identities {
    fn from_iter<I: IntoIterator<Item = (String, Credential)>>(iter: I) -> Self {
        Self {
            credentials: Arc::new(iter.into_iter().collect()),
        }
    }
}
