//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for StudyArc
///
/// The first four variants form the remote-call taxonomy produced at the
/// gateway boundary; the rest cover local failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum StudyArcError {
    /// Transport-level failure, no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// A response was received with a non-2xx status
    #[error("HTTP error {status}: {message}")]
    Http {
        /// Response status code
        status: u16,
        /// Server-provided message, or `HTTP error! status: N`
        message: String,
    },

    /// 2xx response whose envelope reports `success: false`
    #[error("Application error: {0}")]
    Application(String),

    /// Client-side precondition failed before any call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Bug or unexpected state inside the client
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used for user-facing messages and log labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failures - retry-oriented messaging
    Network,
    /// 401 / 403
    Authentication,
    /// 404
    NotFound,
    /// 5xx
    Server,
    /// Remaining 4xx
    Client,
    /// Envelope-level failure
    Application,
    /// Local precondition failure
    Validation,
    /// Config, storage and internal failures
    Local,
}

// User-facing messages returned by `StudyArcError::user_message`

/// Transport failure: no response was received
pub const NETWORK_USER_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";
/// HTTP 404
pub const NOT_FOUND_USER_MESSAGE: &str = "The requested item could not be found.";
/// HTTP 5xx
pub const SERVER_USER_MESSAGE: &str =
    "The server is having trouble right now. Please try again later.";
/// Anything without a more specific message
pub const GENERIC_USER_MESSAGE: &str = "Something went wrong. Please try again.";

impl StudyArcError {
    /// Build an HTTP error, falling back to the conventional status text when
    /// the server did not provide a message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            format!("HTTP error! status: {status}")
        } else {
            message
        };
        Self::Http { status, message }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Http { status, .. } => match *status {
                401 | 403 => ErrorCategory::Authentication,
                404 => ErrorCategory::NotFound,
                s if s >= 500 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::Application(_) => ErrorCategory::Application,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Config(_) | Self::Storage(_) | Self::Internal(_) => ErrorCategory::Local,
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403 responses
    pub fn is_auth_failure(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => NETWORK_USER_MESSAGE.to_string(),
            ErrorCategory::NotFound => NOT_FOUND_USER_MESSAGE.to_string(),
            ErrorCategory::Server => SERVER_USER_MESSAGE.to_string(),
            ErrorCategory::Local => GENERIC_USER_MESSAGE.to_string(),
            ErrorCategory::Authentication
            | ErrorCategory::Client
            | ErrorCategory::Application
            | ErrorCategory::Validation => {
                let raw = self.raw_message();
                if raw.trim().is_empty() {
                    GENERIC_USER_MESSAGE.to_string()
                } else {
                    raw.to_string()
                }
            }
        }
    }

    /// Stable label suitable for metrics and logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Application(_) => "application",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::Internal(_) => "internal",
        }
    }

    fn raw_message(&self) -> &str {
        match self {
            Self::Network(m)
            | Self::Application(m)
            | Self::Validation(m)
            | Self::Config(m)
            | Self::Storage(m)
            | Self::Internal(m) => m,
            Self::Http { message, .. } => message,
        }
    }
}

/// Result type alias for StudyArc operations
pub type Result<T> = std::result::Result<T, StudyArcError>;
