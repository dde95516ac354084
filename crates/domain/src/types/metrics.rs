//! Call-metrics records

use std::time::Duration;

use serde::Serialize;

/// One completed gateway call, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    /// Endpoint path, without the base URL
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Wall time from send to decoded result
    pub duration: Duration,
    /// HTTP status, absent when no response was received
    pub status: Option<u16>,
    /// Error text for failed calls
    pub error: Option<String>,
}

impl CallRecord {
    /// Whether the call produced a value
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Duration in whole milliseconds, saturating
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}
