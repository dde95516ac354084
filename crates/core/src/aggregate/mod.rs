//! Resilient aggregate fetching
//!
//! A screen's data comes from one batch ("primary") call. If that call
//! fails, each field is fetched on its own through a [`FieldPlan`]: an
//! ordered chain of providers where the first success wins.

pub mod chain;
pub mod fetcher;
pub mod plan;

pub use chain::{first_success, fixed, provider, Provider};
pub use fetcher::{fetch_aggregate, AggregateOutcome, AggregateSource};
pub use plan::{FieldPlan, FieldSource};
