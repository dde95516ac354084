//! Call metrics port - receives one record per remote call
//!
//! The gateway reports every call, successful or not. Reporting is
//! fire-and-forget: implementations must be fast and must not block, and the
//! gateway drops (and logs) any error they return.

use studyarc_domain::{CallRecord, Result};

/// Aggregated statistics for one endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallStats {
    /// Endpoint path (e.g., "/dashboard/batch")
    pub endpoint: String,
    /// Total invocations
    pub total_count: u64,
    /// Successful invocations
    pub success_count: u64,
    /// Failed invocations
    pub error_count: u64,
    /// Error rate (0.0 to 1.0)
    pub error_rate: f64,
    /// Average latency in milliseconds
    pub avg_latency_ms: f64,
}

/// Port trait for call metrics collection
pub trait CallMetricsSink: Send + Sync {
    /// Record one completed call
    ///
    /// # Errors
    /// Implementations may fail; callers log and ignore the error.
    fn record_call(&self, record: &CallRecord) -> Result<()>;
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallMetrics;

impl CallMetricsSink for NoopCallMetrics {
    fn record_call(&self, _record: &CallRecord) -> Result<()> {
        Ok(())
    }
}
