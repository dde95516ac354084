//! Configuration structures
//!
//! Every section has defaults so partial config files are accepted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_MAX_GET_ATTEMPTS,
    DEFAULT_RENEWAL_FRACTION, DEFAULT_TOKEN_LIFETIME_SECS,
};
use crate::errors::{Result, StudyArcError};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote service settings
    pub api: ApiConfig,
    /// Credential lifetime and renewal
    pub auth: AuthConfig,
    /// Tracing subscriber settings
    pub logging: LoggingConfig,
}

/// Remote service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (no trailing slash)
    pub base_url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Emit request/response debug logs from the gateway
    pub verbose: bool,
    /// Total attempts for idempotent GET calls (1 disables retries)
    pub max_get_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_API_TIMEOUT_SECS,
            verbose: false,
            max_get_attempts: DEFAULT_MAX_GET_ATTEMPTS,
        }
    }
}

impl ApiConfig {
    /// Per-request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Credential lifetime and renewal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Total validity window of an issued credential
    pub token_lifetime_seconds: u64,
    /// Fraction of the lifetime after which renewal fires
    pub renewal_fraction: f64,
    /// Where the persisted credential slot lives; in-memory when unset
    pub credential_path: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_seconds: DEFAULT_TOKEN_LIFETIME_SECS,
            renewal_fraction: DEFAULT_RENEWAL_FRACTION,
            credential_path: None,
        }
    }
}

impl AuthConfig {
    /// Delay between issuing (or renewing) a credential and the next renewal
    ///
    /// Falls back to the full token lifetime when the fraction does not
    /// produce a representable delay (negative, NaN or overflowing).
    pub fn renewal_delay(&self) -> Duration {
        let lifetime = Duration::from_secs(self.token_lifetime_seconds);
        Duration::try_from_secs_f64(lifetime.as_secs_f64() * self.renewal_fraction)
            .unwrap_or(lifetime)
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info,studyarc_infra=debug`
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), json: false }
    }
}

impl Config {
    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    /// Returns `StudyArcError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(StudyArcError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(StudyArcError::Config("api.timeout_seconds must be > 0".into()));
        }
        if self.api.max_get_attempts == 0 {
            return Err(StudyArcError::Config("api.max_get_attempts must be >= 1".into()));
        }
        if self.auth.token_lifetime_seconds == 0 {
            return Err(StudyArcError::Config("auth.token_lifetime_seconds must be > 0".into()));
        }
        if !(self.auth.renewal_fraction > 0.0 && self.auth.renewal_fraction < 1.0) {
            return Err(StudyArcError::Config(format!(
                "auth.renewal_fraction must be in (0, 1), got {}",
                self.auth.renewal_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_renewal_delay_is_ninety_minutes() {
        let auth = AuthConfig::default();
        assert_eq!(auth.renewal_delay(), Duration::from_secs(90 * 60));
    }

    #[test]
    fn unusable_fraction_falls_back_to_lifetime() {
        let lifetime = Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS);
        for fraction in [-0.5, f64::NAN, f64::INFINITY, f64::MAX] {
            let auth = AuthConfig { renewal_fraction: fraction, ..AuthConfig::default() };
            assert_eq!(auth.renewal_delay(), lifetime, "fraction {fraction}");
        }
    }

    #[test]
    fn constants_are_reexported_at_crate_root() {
        assert_eq!(crate::ENDPOINT_QUIZ_SESSIONS, crate::constants::ENDPOINT_QUIZ_SESSIONS);
        assert_eq!(crate::REQUEST_ID_HEADER, "X-Request-Id");
    }

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let mut config = Config::default();
        config.auth.renewal_fraction = 1.0;
        assert!(matches!(config.validate(), Err(StudyArcError::Config(_))));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(StudyArcError::Config(_))));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[api]\nverbose = true\n").unwrap();
        assert!(config.api.verbose);
        assert_eq!(config.api.timeout_seconds, DEFAULT_API_TIMEOUT_SECS);
        assert_eq!(config.auth, AuthConfig::default());
    }
}
