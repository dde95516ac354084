//! Call metrics for tracking gateway call patterns and timing
//!
//! This module tracks every remote call the gateway makes: total and failed
//! counts, per-endpoint statistics, and a bounded latency window for
//! P50/P95/P99 calculations.
//!
//! ## Design
//! - **VecDeque ring buffer** for O(1) eviction (not Vec with remove(0))
//! - **Poison-safe locking** with explicit match pattern (no .expect())
//! - **SeqCst ordering** for atomics used in derived metrics

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use studyarc_core::{CallMetricsSink, CallStats};
use studyarc_domain::{CallRecord, Result, CALL_SAMPLE_CAPACITY};

use crate::observability::{MetricsError, MetricsResult};

/// Upper bound on distinct endpoints tracked individually
pub const MAX_TRACKED_ENDPOINTS: usize = 256;

#[derive(Debug, Default, Clone)]
struct EndpointTally {
    total: u64,
    errors: u64,
    latency_ms_sum: u64,
}

impl EndpointTally {
    fn to_stats(&self, endpoint: &str) -> CallStats {
        let success = self.total - self.errors;
        let (error_rate, avg_latency_ms) = if self.total == 0 {
            (0.0, 0.0)
        } else {
            (
                self.errors as f64 / self.total as f64,
                self.latency_ms_sum as f64 / self.total as f64,
            )
        };
        CallStats {
            endpoint: endpoint.to_string(),
            total_count: self.total,
            success_count: success,
            error_count: self.errors,
            error_rate,
            avg_latency_ms,
        }
    }
}

/// In-process call metrics
///
/// Cheap to record into from any thread; reads take a consistent snapshot
/// under the relevant lock.
#[derive(Debug)]
pub struct CallMetrics {
    total_calls: AtomicU64,
    failed_calls: AtomicU64,
    /// Latencies of the most recent calls (ring buffer)
    latencies: Mutex<VecDeque<u64>>,
    endpoints: Mutex<HashMap<String, EndpointTally>>,
    capacity: usize,
}

impl Default for CallMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CallMetrics {
    /// Metrics keeping the default number of latency samples
    pub fn new() -> Self {
        Self::with_capacity(CALL_SAMPLE_CAPACITY)
    }

    /// Keep at most `capacity` latency samples
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            total_calls: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
            latencies: Mutex::new(VecDeque::with_capacity(capacity)),
            endpoints: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Record one completed call
    ///
    /// Counters and the latency window are always updated. Returns
    /// `CardinalityExceeded` when the endpoint is new and the endpoint table
    /// is full.
    pub fn record(&self, record: &CallRecord) -> MetricsResult<()> {
        let latency_ms = record.duration_ms();

        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if !record.is_success() {
            self.failed_calls.fetch_add(1, Ordering::SeqCst);
        }

        {
            let mut latencies = lock_recovering(&self.latencies, "CallMetrics::latencies");
            latencies.push_back(latency_ms);
            if latencies.len() > self.capacity {
                latencies.pop_front();
            }
        }

        let mut endpoints = lock_recovering(&self.endpoints, "CallMetrics::endpoints");
        if !endpoints.contains_key(&record.endpoint) && endpoints.len() >= MAX_TRACKED_ENDPOINTS {
            return Err(MetricsError::CardinalityExceeded {
                metric: "call.endpoint".to_string(),
                count: endpoints.len() + 1,
                limit: MAX_TRACKED_ENDPOINTS,
            });
        }

        let tally = endpoints.entry(record.endpoint.clone()).or_default();
        tally.total += 1;
        tally.latency_ms_sum = tally.latency_ms_sum.saturating_add(latency_ms);
        if !record.is_success() {
            tally.errors += 1;
        }

        Ok(())
    }

    /// Calls recorded since creation or the last reset
    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Recorded calls that ended in an error
    pub fn failed_calls(&self) -> u64 {
        self.failed_calls.load(Ordering::SeqCst)
    }

    /// Failed / total, 0.0 before the first call
    pub fn error_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            return 0.0;
        }
        self.failed_calls() as f64 / total as f64
    }

    /// Statistics for one endpoint, `None` if it was never called
    pub fn endpoint_stats(&self, endpoint: &str) -> Option<CallStats> {
        let endpoints = lock_recovering(&self.endpoints, "CallMetrics::endpoints");
        endpoints.get(endpoint).map(|tally| tally.to_stats(endpoint))
    }

    /// Statistics for every tracked endpoint, ordered by endpoint path
    pub fn all_endpoint_stats(&self) -> Vec<CallStats> {
        let endpoints = lock_recovering(&self.endpoints, "CallMetrics::endpoints");
        let mut stats: Vec<CallStats> =
            endpoints.iter().map(|(endpoint, tally)| tally.to_stats(endpoint)).collect();
        stats.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        stats
    }

    /// Get P50 (median) latency in milliseconds
    ///
    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn get_p50_latency_ms(&self) -> MetricsResult<u64> {
        self.percentile_latency(0.50, "P50")
    }

    /// Get P95 latency in milliseconds
    ///
    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn get_p95_latency_ms(&self) -> MetricsResult<u64> {
        self.percentile_latency(0.95, "P95")
    }

    /// Get P99 latency in milliseconds
    ///
    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn get_p99_latency_ms(&self) -> MetricsResult<u64> {
        self.percentile_latency(0.99, "P99")
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        self.total_calls.store(0, Ordering::SeqCst);
        self.failed_calls.store(0, Ordering::SeqCst);
        lock_recovering(&self.latencies, "CallMetrics::latencies").clear();
        lock_recovering(&self.endpoints, "CallMetrics::endpoints").clear();
    }

    /// Holds the lock for the whole computation so the snapshot is
    /// consistent.
    fn percentile_latency(&self, percentile: f64, metric_name: &'static str) -> MetricsResult<u64> {
        let latencies = lock_recovering(&self.latencies, "CallMetrics::latencies");

        if latencies.is_empty() {
            return Err(MetricsError::EmptyData { metric: metric_name });
        }

        let mut sorted: Vec<u64> = latencies.iter().copied().collect();
        sorted.sort_unstable();

        let index = ((sorted.len() as f64 * percentile) as usize).min(sorted.len() - 1);
        Ok(sorted[index])
    }
}

impl CallMetricsSink for CallMetrics {
    fn record_call(&self, record: &CallRecord) -> Result<()> {
        self.record(record).map_err(Into::into)
    }
}

fn lock_recovering<'a, T>(mutex: &'a Mutex<T>, metric: &'static str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poison_err) => {
            tracing::warn!(metric, "Mutex poisoned, recovering data");
            poison_err.into_inner()
        }
    }
}
