//! Conversions from external infrastructure errors into domain errors.

use studyarc_domain::StudyArcError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StudyArcError);

impl From<InfraError> for StudyArcError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StudyArcError> for InfraError {
    fn from(value: StudyArcError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → StudyArcError */
/* -------------------------------------------------------------------------- */

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        let mapped = if err.is_builder() {
            StudyArcError::Internal(format!("invalid HTTP request: {err}"))
        } else if err.is_timeout() {
            StudyArcError::Network(format!("HTTP request timed out: {err}"))
        } else if err.is_connect() {
            StudyArcError::Network(format!("HTTP connection failed: {err}"))
        } else if err.is_body() || err.is_decode() {
            StudyArcError::Network(format!("HTTP response body could not be read: {err}"))
        } else {
            StudyArcError::Network(format!("HTTP request failed: {err}"))
        };
        Self(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error / serde_json::Error → StudyArcError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        Self(StudyArcError::Storage(format!("I/O error: {err}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        Self(StudyArcError::Storage(format!("invalid stored JSON: {err}")))
    }
}
