//! JSON file credential slot
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a crash mid-write never leaves a truncated credential behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyarc_core::CredentialStore;
use studyarc_domain::Result;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::InfraError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    value: String,
    saved_at: DateTime<Utc>,
}

/// Credential slot persisted as a small JSON document
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the file at `path`; parent directories are created on save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the credential file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    /// A missing file is an empty slot. A corrupt file is reported as a
    /// storage error so callers can decide to clear it.
    async fn load(&self) -> Result<Option<String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        let stored: StoredCredential =
            serde_json::from_slice(&bytes).map_err(InfraError::from)?;
        if stored.value.is_empty() {
            return Ok(None);
        }

        debug!(
            path = %self.path.display(),
            saved_at = %stored.saved_at,
            "loaded stored credential"
        );
        Ok(Some(stored.value))
    }

    async fn save(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let document = StoredCredential { value: value.to_string(), saved_at: Utc::now() };
        let bytes = serde_json::to_vec(&document).map_err(InfraError::from)?;

        let temp = self.temp_path();
        let mut file = tokio::fs::File::create(&temp).await.map_err(InfraError::from)?;
        file.write_all(&bytes).await.map_err(InfraError::from)?;
        file.sync_all().await.map_err(InfraError::from)?;
        drop(file);

        if let Err(err) = tokio::fs::rename(&temp, &self.path).await {
            warn!(
                path = %self.path.display(),
                error = %err,
                "failed to move credential into place"
            );
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(InfraError::from(err).into());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
