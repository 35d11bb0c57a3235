//! Configuration for the security scale scenario.

use std::time::Duration;

const GIB: u64 = 1024 * 1024 * 1024;

/// Configuration for a [`SecurityScale`](crate::SecurityScale) run.
#[derive(Debug, Clone)]
pub struct ScaleConfig {
    pub(crate) name: String,
    pub(crate) user_prefix: String,
    pub(crate) users: usize,
    pub(crate) volume_size: u64,
    pub(crate) ha_level: u32,
    pub(crate) detach_timeout: Duration,
    pub(crate) detach_period: Duration,
}

impl ScaleConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ScaleConfigBuilder {
        ScaleConfigBuilder::new()
    }

    /// Name prefix of every round's fan-out instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix of generated identity names.
    pub fn user_prefix(&self) -> &str {
        &self.user_prefix
    }

    /// Number of identities to generate.
    pub fn users(&self) -> usize {
        self.users
    }

    /// Size in bytes of each created volume.
    pub fn volume_size(&self) -> u64 {
        self.volume_size
    }

    /// Replica count of each created volume.
    pub fn ha_level(&self) -> u32 {
        self.ha_level
    }

    /// How long a delete waits for the volume to detach.
    pub fn detach_timeout(&self) -> Duration {
        self.detach_timeout
    }

    /// How often a delete checks whether the volume has detached.
    pub fn detach_period(&self) -> Duration {
        self.detach_period
    }
}

/// Builder for [`ScaleConfig`].
pub struct ScaleConfigBuilder {
    config: ScaleConfig,
}

impl ScaleConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: ScaleConfig {
                name: String::from("security-scale"),
                user_prefix: String::from("scaleUsers"),
                users: 30,
                volume_size: 5 * GIB,
                ha_level: 2,
                detach_timeout: Duration::from_secs(5 * 60),
                detach_period: Duration::from_secs(1),
            },
        }
    }

    /// Default: `"security-scale"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Default: `"scaleUsers"`
    pub fn user_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.user_prefix = prefix.into();
        self
    }

    /// Default: 30
    pub fn users(mut self, users: usize) -> Self {
        self.config.users = users;
        self
    }

    /// Sets the volume size in bytes.
    ///
    /// Default: 5 GiB
    pub fn volume_size(mut self, bytes: u64) -> Self {
        self.config.volume_size = bytes;
        self
    }

    /// Default: 2
    pub fn ha_level(mut self, ha_level: u32) -> Self {
        self.config.ha_level = ha_level;
        self
    }

    /// Default: 5 minutes
    pub fn detach_timeout(mut self, timeout: Duration) -> Self {
        self.config.detach_timeout = timeout;
        self
    }

    /// Default: 1 second
    pub fn detach_period(mut self, period: Duration) -> Self {
        self.config.detach_period = period;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ScaleConfig {
        self.config
    }
}

impl Default for ScaleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
