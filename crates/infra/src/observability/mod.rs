//! Observability infrastructure for gateway call metrics
//!
//! This module provides in-process metrics collection with:
//! - Total and failed call counters
//! - Per-endpoint statistics
//! - Percentile calculations (P50/P95/P99) over a bounded sample window
//! - Poison-safe mutex handling
//! - Endpoint cardinality enforcement
//!
//! ## Design Principles
//!
//! 1. **Poison Recovery**: All mutex locks use explicit poison recovery
//!    pattern: ```rust let guard = match mutex.lock() { Ok(guard) => guard,
//!    Err(poison_err) => { tracing::warn!("Mutex poisoned, recovering");
//!    poison_err.into_inner() } }; ```
//!
//! 2. **Ring Buffers**: VecDeque for O(1) eviction (not Vec with remove(0))
//!
//! 3. **Fire and forget**: The gateway logs and drops any error a sink
//!    returns; a metrics failure never fails a call.
//!
//! ## Error Handling
//!
//! ```rust
//! use studyarc_infra::observability::metrics::CallMetrics;
//!
//! let metrics = CallMetrics::new();
//!
//! if let Err(e) = metrics.get_p95_latency_ms() {
//!     tracing::warn!("No latency data yet: {}", e);
//! }
//! ```

pub mod metrics;

use studyarc_domain::StudyArcError;

/// Metrics error type
///
/// ## Current Behavior
/// - **Poison recovery:** Transparent (logs warning, continues with recovered
///   data)
/// - **Ring buffer overflow:** Automatic eviction (FIFO, no error)
/// - **Endpoint cardinality:** Totals are still counted, the per-endpoint
///   entry is not created and `CardinalityExceeded` is returned
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "P95", "P50", "average")
        metric: &'static str,
    },

    /// Label cardinality limit exceeded
    #[error("Label cardinality exceeded for metric '{metric}': {count} > {limit}")]
    CardinalityExceeded {
        /// Metric name
        metric: String,
        /// Current unique label combination count
        count: usize,
        /// Configured limit
        limit: usize,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

impl From<MetricsError> for StudyArcError {
    fn from(err: MetricsError) -> Self {
        StudyArcError::Internal(format!("metrics: {err}"))
    }
}
