//! Scripted refresher and in-memory credential store

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use studyarc_core::{CredentialStore, TokenRefresher};
use studyarc_domain::{RefreshResponse, Result as DomainResult, StudyArcError};

/// Refresher that replays queued responses, then keeps succeeding without
/// a token
#[derive(Default)]
pub struct ScriptedRefresher {
    responses: Mutex<VecDeque<DomainResult<RefreshResponse>>>,
    calls: AtomicUsize,
}

impl ScriptedRefresher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_token(&self, token: &str) {
        self.responses.lock().push_back(Ok(RefreshResponse { token: Some(token.to_string()) }));
    }

    pub fn push_status(&self, status: u16) {
        self.responses.lock().push_back(Err(StudyArcError::http(status, "")));
    }

    pub fn push_network_error(&self) {
        self.responses
            .lock()
            .push_back(Err(StudyArcError::Network("connection refused".to_string())));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for ScriptedRefresher {
    async fn refresh(&self) -> DomainResult<RefreshResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.lock().pop_front().unwrap_or_else(|| Ok(RefreshResponse::default()))
    }
}

/// Credential slot kept in memory, with call counters and an optional
/// delay before each save lands
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
    saves: AtomicUsize,
    clears: AtomicUsize,
    save_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seeded(value: &str) -> Arc<Self> {
        let store = Self::default();
        *store.value.lock() = Some(value.to_string());
        Arc::new(store)
    }

    pub fn slow(save_delay: Duration) -> Arc<Self> {
        Arc::new(Self { save_delay: Some(save_delay), ..Self::default() })
    }

    pub fn value(&self) -> Option<String> {
        self.value.lock().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> DomainResult<Option<String>> {
        Ok(self.value.lock().clone())
    }

    async fn save(&self, value: &str) -> DomainResult<()> {
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.value.lock() = None;
        Ok(())
    }
}
