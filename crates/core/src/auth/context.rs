//! Shared credential slot
//!
//! Writes go through [`AuthContext`], which is crate-private so only the
//! auth controller can mutate it. Every write bumps the generation.

use std::sync::Arc;

use parking_lot::RwLock;
use studyarc_domain::{AuthStatus, Credential, CredentialToken};

#[derive(Debug, Default)]
struct AuthState {
    generation: u64,
    credential: Option<Credential>,
}

/// Immutable view of the credential taken for a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Generation the credential was installed under
    pub generation: u64,
    /// `None` while signed out
    pub credential: Option<Credential>,
}

impl AuthSnapshot {
    /// Whether a credential is present
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Bearer value to attach, if the credential carries a real token
    pub fn bearer_token(&self) -> Option<&str> {
        self.credential.as_ref().and_then(Credential::bearer_token)
    }

    /// Public summary of this snapshot
    pub fn status(&self) -> AuthStatus {
        match &self.credential {
            Some(credential) => AuthStatus::Authenticated {
                generation: self.generation,
                issued_at: credential.issued_at,
            },
            None => AuthStatus::Anonymous,
        }
    }
}

/// Read-only handle on the credential slot
#[derive(Debug, Clone)]
pub struct AuthReader {
    state: Arc<RwLock<AuthState>>,
}

impl AuthReader {
    /// Reader over an empty slot that nothing will ever write
    pub fn anonymous() -> Self {
        Self { state: Arc::new(RwLock::new(AuthState::default())) }
    }

    /// Copy of the current credential and generation
    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.state.read();
        AuthSnapshot { generation: state.generation, credential: state.credential.clone() }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AuthContext {
    state: Arc<RwLock<AuthState>>,
}

impl AuthContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reader(&self) -> AuthReader {
        AuthReader { state: Arc::clone(&self.state) }
    }

    pub(crate) fn snapshot(&self) -> AuthSnapshot {
        self.reader().snapshot()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Install a credential unconditionally, returning the new generation
    pub(crate) fn install(&self, credential: Credential) -> u64 {
        let mut state = self.state.write();
        state.generation += 1;
        state.credential = Some(credential);
        state.generation
    }

    /// Swap in a renewed credential if `expected` is still the live
    /// generation. A missing token keeps the current one.
    pub(crate) fn renew_if_current(
        &self,
        expected: u64,
        token: Option<CredentialToken>,
        issued_at: chrono::DateTime<chrono::Utc>,
    ) -> Option<(u64, Credential)> {
        let mut state = self.state.write();
        if state.generation != expected {
            return None;
        }
        let current = state.credential.as_ref()?;
        let token = token.unwrap_or_else(|| current.token.clone());
        let renewed = Credential::new(token, issued_at);
        state.generation += 1;
        state.credential = Some(renewed.clone());
        Some((state.generation, renewed))
    }

    /// Clear the slot, returning the generation that was cleared if a
    /// credential was present
    pub(crate) fn clear(&self) -> Option<u64> {
        let mut state = self.state.write();
        let had_credential = state.credential.take().is_some();
        let cleared = state.generation;
        state.generation += 1;
        had_credential.then_some(cleared)
    }

    /// Clear only when `expected` is still the live generation
    pub(crate) fn clear_if_current(&self, expected: u64) -> bool {
        let mut state = self.state.write();
        if state.generation != expected || state.credential.is_none() {
            return false;
        }
        state.credential = None;
        state.generation += 1;
        true
    }
}
