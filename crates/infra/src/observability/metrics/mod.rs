//! Metrics collection modules
//!
//! Sinks for the gateway's per-call records.

pub mod call;
pub mod log;

// Re-export metric types for convenience
pub use call::CallMetrics;
pub use log::{FanOutSink, TracingCallSink};
