//! Port interfaces for credential renewal and persistence

use async_trait::async_trait;
use studyarc_domain::{RefreshResponse, Result};

/// Renews the active credential against the remote service
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Ask the service for a fresh credential.
    ///
    /// A response without a token means the cookie was rotated out of band
    /// and the current token stays in use.
    async fn refresh(&self) -> Result<RefreshResponse>;
}

/// Persisted string slot that survives restarts
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored value, `None` when the slot is empty
    async fn load(&self) -> Result<Option<String>>;

    /// Replace the stored value
    async fn save(&self, value: &str) -> Result<()>;

    /// Empty the slot; clearing an empty slot succeeds
    async fn clear(&self) -> Result<()>;
}
