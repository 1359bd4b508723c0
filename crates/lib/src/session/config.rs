//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::DEFAULT_SESSION_KEY;

/// What [`super::Session::initialize`] does when no authenticated session
/// was persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPolicy {
    /// Create and register a guest account right away
    #[default]
    ProvisionGuest,
    /// Wait for the user to create or recover an account
    StayUnauthenticated,
}

/// Configuration for a [`super::Session`].
///
/// ```
/// use std::time::Duration;
/// use tessera::session::{SessionConfig, StartupPolicy};
///
/// let config: SessionConfig = serde_json::from_str(r#"{"gateway_timeout_ms": 2500}"#).unwrap();
/// assert_eq!(config.storage_key, "tessera.session");
/// assert_eq!(config.startup_policy, StartupPolicy::ProvisionGuest);
/// assert_eq!(config.gateway_timeout(), Some(Duration::from_millis(2500)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage slot holding the session snapshot
    pub storage_key: String,
    pub startup_policy: StartupPolicy,
    /// Deadline for each remote authority call, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SESSION_KEY.to_string(),
            startup_policy: StartupPolicy::default(),
            gateway_timeout_ms: None,
        }
    }
}

impl SessionConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_startup_policy(mut self, policy: StartupPolicy) -> Self {
        self.startup_policy = policy;
        self
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn gateway_timeout(&self) -> Option<Duration> {
        self.gateway_timeout_ms.map(Duration::from_millis)
    }
}
