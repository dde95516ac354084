//! Shared test helpers for `studyarc-core` integration tests.
//!
//! Lightweight in-memory implementations of the core ports so tests can
//! script backend behaviour and count calls.

#![allow(dead_code)]

pub mod auth;
pub mod quiz;

/// Let spawned tasks run until they park again
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
