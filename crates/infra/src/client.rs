//! Client assembly
//!
//! Wires the auth controller, gateway, endpoint bindings and metrics
//! together from a [`Config`]. The controller needs a refresher and the
//! refresher needs a gateway reading the controller's credential, so the
//! refresher is bound once both exist.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use studyarc_core::{AuthController, CallMetricsSink, QuizSessionMachine, TokenRefresher};
use studyarc_domain::{Config, RefreshResponse, Result, StudyArcError};
use tracing::info;

use crate::api::StudyApi;
use crate::credentials;
use crate::gateway::Gateway;
use crate::observability::metrics::{CallMetrics, FanOutSink, TracingCallSink};

/// Refresher whose target is attached after construction
#[derive(Debug, Default)]
struct BoundRefresher {
    api: OnceLock<StudyApi>,
}

#[async_trait]
impl TokenRefresher for BoundRefresher {
    async fn refresh(&self) -> Result<RefreshResponse> {
        match self.api.get() {
            Some(api) => api.refresh().await,
            None => Err(StudyArcError::Internal("token refresher used before it was bound".into())),
        }
    }
}

/// Fully wired client
#[derive(Debug, Clone)]
pub struct StudyArcClient {
    auth: AuthController,
    api: StudyApi,
    metrics: Arc<CallMetrics>,
}

impl StudyArcClient {
    /// Build every component from `config`
    ///
    /// # Errors
    /// Returns `StudyArcError::Config` when `config` fails validation, or the
    /// HTTP client error if it cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        crate::config::validate(config)?;

        let refresher = Arc::new(BoundRefresher::default());
        let store = credentials::from_config(&config.auth);
        let auth = AuthController::new(refresher.clone(), store, config.auth.renewal_delay());

        let metrics = Arc::new(CallMetrics::new());
        let sink: Arc<dyn CallMetricsSink> =
            Arc::new(FanOutSink::new(vec![metrics.clone(), Arc::new(TracingCallSink)]));
        let gateway = Arc::new(Gateway::new(&config.api, auth.reader(), sink)?);
        let api = StudyApi::new(gateway);

        refresher
            .api
            .set(api.clone())
            .map_err(|_| StudyArcError::Internal("token refresher bound twice".into()))?;

        info!(
            base_url = %config.api.base_url,
            renewal_delay_secs = config.auth.renewal_delay().as_secs(),
            "study client ready"
        );

        Ok(Self { auth, api, metrics })
    }

    /// Session controller
    pub fn auth(&self) -> &AuthController {
        &self.auth
    }

    /// Endpoint bindings
    pub fn api(&self) -> &StudyApi {
        &self.api
    }

    /// Call metrics recorded by the gateway
    pub fn metrics(&self) -> &Arc<CallMetrics> {
        &self.metrics
    }

    /// Fresh quiz session bound to this client's backend
    pub fn quiz_session(&self) -> QuizSessionMachine {
        QuizSessionMachine::new(Arc::new(self.api.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbound_refresher_fails_without_panicking() {
        let refresher = BoundRefresher::default();
        assert!(matches!(refresher.refresh().await, Err(StudyArcError::Internal(_))));
    }

    #[tokio::test]
    async fn from_config_starts_anonymous() {
        let client = StudyArcClient::from_config(&Config::default()).unwrap();
        assert!(!client.auth().status().is_authenticated());
        assert!(client.api().gateway().auth_snapshot().credential.is_none());
        assert_eq!(client.metrics().total_calls(), 0);
    }

    #[test]
    fn from_config_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(StudyArcClient::from_config(&config), Err(StudyArcError::Config(_))));
    }

    #[test]
    fn from_config_rejects_negative_renewal_fraction() {
        let mut config = Config::default();
        config.auth.renewal_fraction = -0.5;
        assert!(matches!(StudyArcClient::from_config(&config), Err(StudyArcError::Config(_))));
    }

    #[test]
    fn from_config_rejects_nan_renewal_fraction() {
        let mut config = Config::default();
        config.auth.renewal_fraction = f64::NAN;
        assert!(matches!(StudyArcClient::from_config(&config), Err(StudyArcError::Config(_))));
    }
}
