//! Primary-then-fallback aggregate fetch

use std::future::Future;

use futures::future::join_all;
use serde::Serialize;
use studyarc_domain::{Result, StudyArcError};
use tracing::{debug, info, warn};

use super::plan::{FieldPlan, Resolution};

/// Where the aggregate's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateSource {
    /// The batch endpoint answered
    Primary,
    /// Assembled from per-field fallback calls
    Fallback,
}

/// Result of one aggregate fetch
///
/// A field is `None` only if every source for it failed or it was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOutcome<A> {
    /// Aggregate value; fields that could not be loaded stay `None`
    pub data: A,
    /// Where `data` came from
    pub source: AggregateSource,
    /// Fields whose whole provider chain failed
    pub failed_fields: Vec<String>,
    /// Fields intentionally not fetched
    pub skipped_fields: Vec<String>,
    /// Summary for the UI, present only when a required field failed
    pub error: Option<String>,
}

impl<A> AggregateOutcome<A> {
    fn primary(data: A) -> Self {
        Self {
            data,
            source: AggregateSource::Primary,
            failed_fields: Vec::new(),
            skipped_fields: Vec::new(),
            error: None,
        }
    }

    /// Whether the batch endpoint failed and fallbacks were used
    pub fn is_degraded(&self) -> bool {
        self.source == AggregateSource::Fallback
    }
}

/// Fetch aggregate `name` from `primary`, falling back to `plans`.
///
/// When `primary` succeeds the plans are dropped without starting a single
/// provider. Otherwise every plan runs concurrently and all of them are
/// awaited; each plan only ever touches its own field.
pub async fn fetch_aggregate<A, P>(
    name: &str,
    primary: P,
    plans: Vec<FieldPlan<A>>,
) -> AggregateOutcome<A>
where
    A: Default + 'static,
    P: Future<Output = Result<A>>,
{
    let primary_error = match primary.await {
        Ok(data) => {
            debug!(aggregate = name, "primary fetch succeeded");
            return AggregateOutcome::primary(data);
        }
        Err(err) => err,
    };

    warn!(
        aggregate = name,
        error = %primary_error,
        fields = plans.len(),
        "primary fetch failed, falling back to per-field calls"
    );

    let resolved = join_all(plans.into_iter().map(FieldPlan::resolve)).await;

    let mut data = A::default();
    let mut failed_fields = Vec::new();
    let mut skipped_fields = Vec::new();
    let mut required_failures: Vec<(&'static str, Option<StudyArcError>)> = Vec::new();

    for (field, required, resolution) in resolved {
        match resolution {
            Resolution::Filled(patch) => patch(&mut data),
            Resolution::Skipped => skipped_fields.push(field.to_string()),
            Resolution::Failed(errors) => {
                debug!(
                    aggregate = name,
                    field,
                    attempts = errors.len(),
                    "field fallback exhausted"
                );
                failed_fields.push(field.to_string());
                if required {
                    required_failures.push((field, errors.into_iter().last()));
                }
            }
        }
    }

    let error = summarize(&required_failures);
    info!(
        aggregate = name,
        failed = failed_fields.len(),
        skipped = skipped_fields.len(),
        "aggregate assembled from fallbacks"
    );

    AggregateOutcome {
        data,
        source: AggregateSource::Fallback,
        failed_fields,
        skipped_fields,
        error,
    }
}

fn summarize(failures: &[(&'static str, Option<StudyArcError>)]) -> Option<String> {
    let (_, last_error) = failures.first()?;
    let fields = failures.iter().map(|(field, _)| *field).collect::<Vec<_>>().join(", ");
    let reason = last_error
        .as_ref()
        .map_or_else(|| "no source available".to_string(), StudyArcError::user_message);
    Some(format!("Failed to load {fields}: {reason}"))
}
