//! # StudyArc Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client with retries for idempotent reads
//! - The remote service gateway (auth header, envelope decoding, metrics)
//! - Endpoint bindings and per-screen aggregate plans
//! - Credential stores (file and in-memory)
//! - Call metrics sinks
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `studyarc-core`
//! - Depends on `studyarc-domain` and `studyarc-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod observability;
pub mod telemetry;

// Re-export commonly used items
pub use api::StudyApi;
pub use client::StudyArcClient;
pub use credentials::{FileCredentialStore, InMemoryCredentialStore};
pub use errors::InfraError;
pub use gateway::{Gateway, RequestOptions};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::metrics::{CallMetrics, FanOutSink, TracingCallSink};
pub use telemetry::init_tracing;
