//! Remote service gateway
//!
//! The single place HTTP responses are turned into typed results or
//! [`studyarc_domain::StudyArcError`]s.

pub mod client;
mod envelope;

pub use client::{Gateway, RequestOptions};
