//! # StudyArc Core
//!
//! Orchestration logic - no HTTP, storage or platform code.
//!
//! This crate contains:
//! - Authentication context, controller and renewal scheduling
//! - Resilient aggregate fetching (primary call with per-field fallbacks)
//! - Quiz session state machine
//! - Port interfaces (traits) implemented by `studyarc-infra`
//!
//! ## Architecture Principles
//! - Only depends on `studyarc-domain`
//! - All remote access goes through ports
//! - tokio is used for timers and tasks only

pub mod aggregate;
pub mod auth;
pub mod quiz;
pub mod time;

// Infrastructure ports
pub mod call_metrics_ports;

pub use aggregate::{
    fetch_aggregate, first_success, AggregateOutcome, AggregateSource, FieldPlan, FieldSource,
    Provider,
};
pub use auth::{
    AuthController, AuthReader, AuthSnapshot, CredentialStore, RenewalScheduler, TokenRefresher,
};
pub use call_metrics_ports::{CallMetricsSink, CallStats, NoopCallMetrics};
pub use quiz::{
    AdvanceOutcome, QuizBackend, QuizPhase, QuizPhaseKind, QuizSessionMachine, QuizSessionState,
    QuizView, StartOutcome,
};
pub use time::{Clock, ManualClock, SystemClock};
