//! Call sink that writes one structured log event per call

use studyarc_core::CallMetricsSink;
use studyarc_domain::{CallRecord, Result};

/// Logs successful calls at `debug` and failed calls at `warn`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCallSink;

impl CallMetricsSink for TracingCallSink {
    fn record_call(&self, record: &CallRecord) -> Result<()> {
        match &record.error {
            None => tracing::debug!(
                target: "studyarc::calls",
                endpoint = %record.endpoint,
                method = %record.method,
                status = ?record.status,
                duration_ms = record.duration_ms(),
                "call completed"
            ),
            Some(error) => tracing::warn!(
                target: "studyarc::calls",
                endpoint = %record.endpoint,
                method = %record.method,
                status = ?record.status,
                duration_ms = record.duration_ms(),
                error = %error,
                "call failed"
            ),
        }
        Ok(())
    }
}

/// Forwards every record to each inner sink
///
/// Every sink is called even if an earlier one fails; the first error is
/// returned.
pub struct FanOutSink {
    sinks: Vec<std::sync::Arc<dyn CallMetricsSink>>,
}

impl FanOutSink {
    /// Forward to `sinks` in order
    pub fn new(sinks: Vec<std::sync::Arc<dyn CallMetricsSink>>) -> Self {
        Self { sinks }
    }
}

impl std::fmt::Debug for FanOutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutSink").field("sinks", &self.sinks.len()).finish()
    }
}

impl CallMetricsSink for FanOutSink {
    fn record_call(&self, record: &CallRecord) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.record_call(record) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
