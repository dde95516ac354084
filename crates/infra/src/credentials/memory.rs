//! Process-local credential slot

use async_trait::async_trait;
use parking_lot::Mutex;
use studyarc_core::CredentialStore;
use studyarc_domain::Result;

/// Credential slot that lives as long as the process
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl InMemoryCredentialStore {
    /// Empty slot
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.value.lock().clone())
    }

    async fn save(&self, value: &str) -> Result<()> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.value.lock().take();
        Ok(())
    }
}
