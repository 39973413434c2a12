//! Library configuration

use photovault_gateway::{AccessScope, IdentityEndpoint, StorageEndpoint};
use serde::Deserialize;
use std::time::Duration;

/// Password policy enforced before credentials reach the provider
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum length
    pub min_length: usize,
    /// Maximum length
    pub max_length: usize,
    /// Require at least one lowercase letter
    pub require_lowercase: bool,
    /// Require at least one uppercase letter
    pub require_uppercase: bool,
    /// Require at least one digit
    pub require_numbers: bool,
    /// Require at least one symbol
    pub require_special_characters: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 24,
            require_lowercase: true,
            require_uppercase: true,
            require_numbers: true,
            require_special_characters: true,
        }
    }
}

/// Identity provider configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity pool identifier
    pub pool_id: String,
    /// Client application identifier
    pub client_id: String,
    /// Accounts sign in with their email address as the username
    pub login_with_email: bool,
    /// Password policy
    pub password_policy: PasswordPolicy,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            pool_id: "local-pool".to_string(),
            client_id: "local-client".to_string(),
            login_with_email: true,
            password_policy: PasswordPolicy::default(),
        }
    }
}

/// Object store configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket identifier
    pub bucket: String,
    /// Bucket region
    pub region: String,
    /// Default access level
    pub default_access_level: AccessScope,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "photos".to_string(),
            region: "local".to_string(),
            default_access_level: AccessScope::Private,
        }
    }
}

/// Library configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity provider settings
    pub identity: IdentityConfig,
    /// Object store settings
    pub storage: StorageConfig,
    /// How long to wait after an upload before the deferred gallery refresh.
    ///
    /// A heuristic for the external thumbnail pipeline's latency, not a
    /// completion signal: a slower pipeline still shows the fallback until
    /// the next refresh.
    pub refresh_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            storage: StorageConfig::default(),
            refresh_delay_ms: 4_000,
        }
    }
}

impl Config {
    /// Set the identity pool and client identifiers
    pub fn with_identity_pool(
        mut self,
        pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.identity.pool_id = pool_id.into();
        self.identity.client_id = client_id.into();
        self
    }

    /// Set the bucket and region
    pub fn with_bucket(mut self, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        self.storage.bucket = bucket.into();
        self.storage.region = region.into();
        self
    }

    /// Set the deferred-refresh delay
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay_ms = delay.as_millis() as u64;
        self
    }

    /// The deferred-refresh delay as a [`Duration`]
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Build the identity gateway endpoint for this configuration
    pub fn identity_endpoint(&self, api_url: impl Into<String>) -> IdentityEndpoint {
        IdentityEndpoint::with_url(api_url)
            .with_pool(&self.identity.pool_id, &self.identity.client_id)
    }

    /// Build the storage gateway endpoint for this configuration
    pub fn storage_endpoint(&self, api_url: impl Into<String>) -> StorageEndpoint {
        let mut endpoint = StorageEndpoint::with_url(api_url)
            .with_bucket(&self.storage.bucket, &self.storage.region);
        endpoint.scope = self.storage.default_access_level;
        endpoint
    }
}
