//! Ordered provider chains
//!
//! A chain is tried front to back; the first `Ok` wins and every error
//! before it is collected. A static default is just a provider that cannot
//! fail, placed last.

use std::future::Future;

use futures::future::BoxFuture;
use studyarc_domain::{Result, StudyArcError};

/// One lazily started source for a value
pub type Provider<V> = Box<dyn FnOnce() -> BoxFuture<'static, Result<V>> + Send>;

/// Wrap an async closure as a [`Provider`]
pub fn provider<V, F, Fut>(call: F) -> Provider<V>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    Box::new(move || Box::pin(call()))
}

/// Provider that always yields `value`
pub fn fixed<V>(value: V) -> Provider<V>
where
    V: Send + 'static,
{
    Box::new(move || Box::pin(async move { Ok(value) }))
}

/// Run `providers` in order until one succeeds.
///
/// Providers after the winner are never started. An empty chain fails with
/// no errors.
pub async fn first_success<V>(
    providers: Vec<Provider<V>>,
) -> std::result::Result<V, Vec<StudyArcError>> {
    let mut errors = Vec::new();
    for start in providers {
        match start().await {
            Ok(value) => return Ok(value),
            Err(err) => errors.push(err),
        }
    }
    Err(errors)
}
