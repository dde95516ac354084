//! Authentication types
//!
//! A credential is either an explicit bearer token or a marker meaning the
//! real token rides in an HTTP-only cookie.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::COOKIE_CREDENTIAL_MARKER;

/// The secret half of a credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CredentialToken {
    /// Token sent explicitly in the `Authorization` header
    Bearer(String),
    /// Token held by the cookie jar; nothing to attach
    CookieBacked,
}

impl CredentialToken {
    /// Interpret a value read back from the persisted credential slot.
    ///
    /// Empty values mean "no credential"; the cookie marker maps to
    /// [`CredentialToken::CookieBacked`].
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw == COOKIE_CREDENTIAL_MARKER {
            Some(Self::CookieBacked)
        } else {
            Some(Self::Bearer(raw.to_string()))
        }
    }

    /// Value written to the persisted credential slot
    pub fn to_stored(&self) -> String {
        match self {
            Self::Bearer(token) => token.clone(),
            Self::CookieBacked => COOKIE_CREDENTIAL_MARKER.to_string(),
        }
    }

    /// Bearer value to attach, if this is a real (non-placeholder) token
    pub fn bearer(&self) -> Option<&str> {
        match self {
            Self::Bearer(token)
                if !token.trim().is_empty() && token != COOKIE_CREDENTIAL_MARKER =>
            {
                Some(token.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::CookieBacked => f.write_str("CookieBacked"),
        }
    }
}

/// Session credential plus the moment it was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token or cookie marker
    pub token: CredentialToken,
    /// When the credential was issued or last renewed
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    /// Credential from an already classified token
    pub fn new(token: CredentialToken, issued_at: DateTime<Utc>) -> Self {
        Self { token, issued_at }
    }

    /// Credential carrying a bearer token
    pub fn bearer(token: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self::new(CredentialToken::Bearer(token.into()), issued_at)
    }

    /// Credential whose token lives in an HTTP-only cookie
    pub fn cookie_backed(issued_at: DateTime<Utc>) -> Self {
        Self::new(CredentialToken::CookieBacked, issued_at)
    }

    /// Header value to attach to outgoing calls, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.bearer()
    }
}

/// Authentication state exposed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthStatus {
    /// No credential is installed
    Anonymous,
    /// A credential is installed
    Authenticated {
        /// Generation the credential was installed under
        generation: u64,
        /// When the credential was issued or last renewed
        issued_at: DateTime<Utc>,
    },
}

impl AuthStatus {
    /// Whether a credential is installed
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// Explicit logout
    UserRequested,
    /// The renewal call failed
    RenewalFailed,
    /// The service rejected the credential on an ordinary call
    InvalidCredential,
}

/// Transitions broadcast by the auth controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    /// A credential was installed by login or restore
    LoggedIn {
        /// Generation of the new credential
        generation: u64,
    },
    /// The credential was renewed
    Renewed {
        /// Generation after the renewal
        generation: u64,
    },
    /// The session ended
    LoggedOut {
        /// Generation of the credential that was dropped
        generation: u64,
        /// What ended the session
        reason: LogoutReason,
    },
}

/// Renewal read model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenewalStatus {
    /// Whether a renewal timer is currently armed
    pub pending: bool,
    /// Generation the pending timer is bound to
    pub generation: Option<u64>,
    /// When the pending timer should fire
    pub due_at: Option<DateTime<Utc>>,
    /// Time of the last successful renewal
    pub last_renewed_at: Option<DateTime<Utc>>,
}

/// `data` payload of a successful refresh call
///
/// Cookie-based deployments return no token; the cookie was rotated
/// out of band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New bearer token, if the service issued one
    #[serde(default)]
    pub token: Option<String>,
}
