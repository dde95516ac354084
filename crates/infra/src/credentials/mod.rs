//! Credential persistence
//!
//! Implementations of the core `CredentialStore` port. The slot holds a
//! single string: a bearer token or the cookie-session marker.

pub mod file;
pub mod memory;

use std::sync::Arc;

use studyarc_core::CredentialStore;
use studyarc_domain::AuthConfig;

pub use file::FileCredentialStore;
pub use memory::InMemoryCredentialStore;

/// Store selected by configuration: file-backed when a path is set,
/// in-memory otherwise
pub fn from_config(config: &AuthConfig) -> Arc<dyn CredentialStore> {
    match &config.credential_path {
        Some(path) => Arc::new(FileCredentialStore::new(path)),
        None => Arc::new(InMemoryCredentialStore::new()),
    }
}
