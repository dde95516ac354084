//! Auth controller - single writer of the shared credential

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use studyarc_domain::{
    AuthEvent, AuthStatus, Credential, CredentialToken, LogoutReason, RenewalStatus, Result,
    StudyArcError,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::context::{AuthContext, AuthReader};
use super::ports::{CredentialStore, TokenRefresher};
use super::renewal::RenewalScheduler;
use crate::time::{Clock, SystemClock};

const EVENT_CHANNEL_CAPACITY: usize = 16;

struct ControllerInner {
    context: AuthContext,
    refresher: Arc<dyn TokenRefresher>,
    store: Arc<dyn CredentialStore>,
    scheduler: RenewalScheduler,
    renewal_delay: Duration,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<AuthEvent>,
    last_renewed_at: Mutex<Option<DateTime<Utc>>>,
    /// Serializes store writes with the context change and timer they
    /// belong to, so a slow save cannot outlive the session it was for
    session_lock: tokio::sync::Mutex<()>,
}

/// Owns login, logout and background renewal of the session credential
///
/// Cloning is cheap; all clones drive the same session. The renewal timer
/// only holds a weak reference, so dropping the last clone cancels it.
#[derive(Clone)]
pub struct AuthController {
    inner: Arc<ControllerInner>,
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("status", &self.status())
            .field("renewal", &self.renewal_status())
            .finish_non_exhaustive()
    }
}

impl AuthController {
    /// Create a controller that renews `renewal_delay` after each login
    /// or successful renewal
    pub fn new(
        refresher: Arc<dyn TokenRefresher>,
        store: Arc<dyn CredentialStore>,
        renewal_delay: Duration,
    ) -> Self {
        Self::with_clock(refresher, store, renewal_delay, Arc::new(SystemClock))
    }

    /// Like [`AuthController::new`] with an explicit clock
    pub fn with_clock(
        refresher: Arc<dyn TokenRefresher>,
        store: Arc<dyn CredentialStore>,
        renewal_delay: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(ControllerInner {
                context: AuthContext::new(),
                refresher,
                store,
                scheduler: RenewalScheduler::new(),
                renewal_delay,
                clock,
                events,
                last_renewed_at: Mutex::new(None),
                session_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Read-only handle for the gateway
    pub fn reader(&self) -> AuthReader {
        self.inner.context.reader()
    }

    /// Current authentication status
    pub fn status(&self) -> AuthStatus {
        self.inner.context.snapshot().status()
    }

    /// Pending timer and last successful renewal
    pub fn renewal_status(&self) -> RenewalStatus {
        let scheduler = &self.inner.scheduler;
        RenewalStatus {
            pending: scheduler.is_pending(),
            generation: scheduler.pending_generation(),
            due_at: scheduler.due_at(),
            last_renewed_at: *self.inner.last_renewed_at.lock(),
        }
    }

    /// Receive login, renewal and logout events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Install a credential obtained from login or signup.
    ///
    /// Persistence failures are logged; the session still starts.
    #[instrument(skip_all)]
    pub async fn login(&self, credential: Credential) -> u64 {
        let _session = self.inner.session_lock.lock().await;
        let stored = credential.token.to_stored();
        if let Err(err) = self.inner.store.save(&stored).await {
            warn!(error = %err, "failed to persist credential");
        }

        let generation = self.inner.context.install(credential);
        info!(generation, "session started");
        self.inner.emit(AuthEvent::LoggedIn { generation });
        self.inner.schedule_renewal(generation);
        generation
    }

    /// Resume a session from the credential store.
    ///
    /// Returns `false` when nothing usable was stored.
    #[instrument(skip_all)]
    pub async fn restore(&self) -> Result<bool> {
        let _session = self.inner.session_lock.lock().await;
        let Some(raw) = self.inner.store.load().await? else {
            debug!("no stored credential");
            return Ok(false);
        };
        let Some(token) = CredentialToken::from_stored(&raw) else {
            debug!("stored credential is empty");
            return Ok(false);
        };

        let generation = self.inner.context.install(Credential::new(token, self.inner.clock.now()));
        info!(generation, "session restored");
        self.inner.emit(AuthEvent::LoggedIn { generation });
        self.inner.schedule_renewal(generation);
        Ok(true)
    }

    /// End the session at the user's request
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        let _session = self.inner.session_lock.lock().await;
        self.inner.scheduler.cancel_existing();
        let cleared = self.inner.context.clear();
        let stored = self.inner.store.clear().await;

        if let Some(generation) = cleared {
            info!(generation, "session ended");
            self.inner.emit(AuthEvent::LoggedOut {
                generation,
                reason: LogoutReason::UserRequested,
            });
        }
        stored
    }

    /// Renew immediately instead of waiting for the timer
    #[instrument(skip_all)]
    pub async fn renew_now(&self) -> Result<()> {
        let snapshot = self.inner.context.snapshot();
        if !snapshot.is_authenticated() {
            return Err(StudyArcError::Validation("Not signed in".to_string()));
        }
        self.inner.run_renewal(snapshot.generation).await
    }

    /// Drop a credential the service rejected, if it is still the live one.
    ///
    /// Returns whether this call ended the session.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, generation: u64) -> bool {
        self.inner.force_logout(generation, LogoutReason::InvalidCredential).await
    }

    /// Stop background renewal without touching the credential
    pub fn teardown(&self) {
        if self.inner.scheduler.cancel_existing() {
            debug!("renewal timer torn down");
        }
    }
}

impl ControllerInner {
    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn schedule_renewal(self: &Arc<Self>, generation: u64) {
        let now = self.clock.now();
        let due_at = chrono::Duration::from_std(self.renewal_delay)
            .ok()
            .and_then(|delay| now.checked_add_signed(delay))
            .unwrap_or(now);

        let weak: Weak<Self> = Arc::downgrade(self);
        self.scheduler.schedule(generation, self.renewal_delay, due_at, move || async move {
            if let Some(inner) = weak.upgrade() {
                if let Err(err) = inner.run_renewal(generation).await {
                    debug!(error = %err, "scheduled renewal failed");
                }
            }
        });
    }

    async fn run_renewal(self: &Arc<Self>, generation: u64) -> Result<()> {
        if self.context.generation() != generation {
            debug!(generation, "skipping renewal for stale credential");
            return Ok(());
        }

        match self.refresher.refresh().await {
            Ok(response) => {
                let now = self.clock.now();
                let token = response.token.as_deref().and_then(CredentialToken::from_stored);
                let returned_token = token.is_some();

                let Some((next, credential)) = self.context.renew_if_current(generation, token, now)
                else {
                    debug!(generation, "discarding renewal for replaced credential");
                    return Ok(());
                };

                let _session = self.session_lock.lock().await;
                if self.context.generation() != next {
                    debug!(generation = next, "session ended while renewing, renewal dropped");
                    return Ok(());
                }

                if returned_token {
                    if let Err(err) = self.store.save(&credential.token.to_stored()).await {
                        warn!(error = %err, "failed to persist renewed credential");
                    }
                }

                *self.last_renewed_at.lock() = Some(now);
                info!(generation = next, "credential renewed");
                self.emit(AuthEvent::Renewed { generation: next });
                self.schedule_renewal(next);
                Ok(())
            }
            Err(err) => {
                warn!(generation, error = %err, "credential renewal failed");
                self.force_logout(generation, LogoutReason::RenewalFailed).await;
                Err(err)
            }
        }
    }

    async fn force_logout(&self, generation: u64, reason: LogoutReason) -> bool {
        let _session = self.session_lock.lock().await;
        if !self.context.clear_if_current(generation) {
            debug!(generation, ?reason, "credential already replaced, logout skipped");
            return false;
        }

        self.scheduler.cancel_existing();
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "failed to clear stored credential");
        }
        info!(generation, ?reason, "session ended");
        self.emit(AuthEvent::LoggedOut { generation, reason });
        true
    }
}
