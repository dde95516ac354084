//! Single-slot renewal timer
//!
//! The slot holds at most one pending timer. [`RenewalScheduler::schedule`]
//! always runs [`RenewalScheduler::cancel_existing`] first. Cancelling only
//! clears the timer: a renewal job that has already started keeps running
//! and is expected to check its generation before acting.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct PendingRenewal {
    timer_id: u64,
    generation: u64,
    due_at: DateTime<Utc>,
    cancel: CancellationToken,
    _handle: JoinHandle<()>,
}

type Slot = Arc<Mutex<Option<PendingRenewal>>>;

/// Owns the one renewal timer of an authenticated session
#[derive(Debug, Default)]
pub struct RenewalScheduler {
    slot: Slot,
    next_timer_id: AtomicU64,
}

impl RenewalScheduler {
    /// Scheduler with an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for `generation`; `job` runs once `delay` elapses.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, generation: u64, delay: Duration, due_at: DateTime<Utc>, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            debug!(generation = previous.generation, "replaced pending renewal timer");
        }

        let timer_id = self.next_timer_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let fired_slot = Arc::clone(&self.slot);

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(generation, "renewal timer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    {
                        let mut slot = fired_slot.lock();
                        if slot.as_ref().is_some_and(|p| p.timer_id == timer_id) {
                            *slot = None;
                        }
                    }
                    debug!(generation, "renewal timer fired");
                    job().await;
                }
            }
        });

        debug!(generation, delay_secs = delay.as_secs(), "renewal scheduled");
        *slot = Some(PendingRenewal { timer_id, generation, due_at, cancel, _handle: handle });
    }

    /// Clear the pending timer, if any. Returns whether one was pending.
    pub fn cancel_existing(&self) -> bool {
        match self.slot.lock().take() {
            Some(pending) => {
                pending.cancel.cancel();
                debug!(generation = pending.generation, "renewal timer cleared");
                true
            }
            None => false,
        }
    }

    /// Whether a timer is armed
    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Generation the pending timer is bound to
    pub fn pending_generation(&self) -> Option<u64> {
        self.slot.lock().as_ref().map(|p| p.generation)
    }

    /// When the pending timer is expected to fire
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().as_ref().map(|p| p.due_at)
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        if let Some(pending) = self.slot.lock().take() {
            pending.cancel.cancel();
        }
    }
}
