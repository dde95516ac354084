//! Per-field fallback plans
//!
//! A [`FieldPlan`] owns the provider chain for one field of an aggregate
//! and knows how to write the winning value into it. Plans are built with
//! [`FieldPlan::field`] and the [`FieldSource`] builder:
//!
//! ```ignore
//! FieldPlan::field("statistics", |d: &mut DashboardData, v| d.statistics = Some(v))
//!     .from(move || api.get(ENDPOINT_STATISTICS))
//!     .static_default(StudyStatistics::default())
//!     .into_plan()
//! ```

use std::future::Future;

use futures::future::BoxFuture;
use studyarc_domain::{Result, StudyArcError};

use super::chain::{first_success, fixed, provider, Provider};

type Patch<A> = Box<dyn FnOnce(&mut A) + Send>;

/// How a plan finished
pub(crate) enum Resolution<A> {
    Filled(Patch<A>),
    Failed(Vec<StudyArcError>),
    Skipped,
}

enum PlanKind<A> {
    Skip,
    Run(BoxFuture<'static, std::result::Result<Patch<A>, Vec<StudyArcError>>>),
}

/// Fallback recipe for one field of aggregate `A`
pub struct FieldPlan<A> {
    name: &'static str,
    required: bool,
    kind: PlanKind<A>,
}

impl<A> std::fmt::Debug for FieldPlan<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldPlan")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("skipped", &matches!(self.kind, PlanKind::Skip))
            .finish()
    }
}

impl<A: 'static> FieldPlan<A> {
    /// Start building the plan for field `name`, written through `setter`
    pub fn field<V>(name: &'static str, setter: fn(&mut A, V)) -> FieldSource<A, V>
    where
        V: Send + 'static,
    {
        FieldSource { name, setter, providers: Vec::new(), required: false, skipped: false }
    }

    /// A field left empty on purpose, e.g. data only signed-in users have
    pub const fn skip(name: &'static str) -> Self {
        Self { name, required: false, kind: PlanKind::Skip }
    }

    /// Aggregate field this plan fills
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a failure of this field is reported in the summary
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the field is left empty without calling anything
    pub const fn is_skipped(&self) -> bool {
        matches!(self.kind, PlanKind::Skip)
    }

    pub(crate) async fn resolve(self) -> (&'static str, bool, Resolution<A>) {
        let resolution = match self.kind {
            PlanKind::Skip => Resolution::Skipped,
            PlanKind::Run(chain) => match chain.await {
                Ok(patch) => Resolution::Filled(patch),
                Err(errors) => Resolution::Failed(errors),
            },
        };
        (self.name, self.required, resolution)
    }
}

/// Builder for the provider chain of one field
pub struct FieldSource<A, V> {
    name: &'static str,
    setter: fn(&mut A, V),
    providers: Vec<Provider<V>>,
    required: bool,
    skipped: bool,
}

impl<A, V> FieldSource<A, V>
where
    A: 'static,
    V: Send + 'static,
{
    /// Append a remote source to the chain
    #[must_use]
    pub fn from<F, Fut>(mut self, call: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.providers.push(provider(call));
        self
    }

    /// Append a prebuilt provider
    #[must_use]
    pub fn provider(mut self, provider: Provider<V>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Last-resort value used once every remote source has failed
    #[must_use]
    pub fn static_default(mut self, value: V) -> Self {
        self.providers.push(fixed(value));
        self
    }

    /// A failure of this field is reported in the aggregate's error
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Skip the field instead of calling anything when `condition` holds
    #[must_use]
    pub fn skip_if(mut self, condition: bool) -> Self {
        self.skipped = self.skipped || condition;
        self
    }

    /// Finish the builder
    pub fn into_plan(self) -> FieldPlan<A> {
        if self.skipped {
            return FieldPlan::skip(self.name);
        }

        let setter = self.setter;
        let providers = self.providers;
        let chain = async move {
            first_success(providers).await.map(|value| {
                let patch: Patch<A> = Box::new(move |aggregate: &mut A| setter(aggregate, value));
                patch
            })
        };
        FieldPlan { name: self.name, required: self.required, kind: PlanKind::Run(Box::pin(chain)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Pair {
        left: Option<u32>,
        right: Option<String>,
    }

    #[tokio::test]
    async fn filled_plan_writes_through_setter() {
        let plan = FieldPlan::field("left", |p: &mut Pair, v: u32| p.left = Some(v))
            .from(|| async { Ok(3) })
            .into_plan();

        let (name, required, resolution) = plan.resolve().await;
        assert_eq!(name, "left");
        assert!(!required);

        let mut pair = Pair::default();
        match resolution {
            Resolution::Filled(patch) => patch(&mut pair),
            _ => panic!("expected a value"),
        }
        assert_eq!(pair.left, Some(3));
        assert!(pair.right.is_none());
    }

    #[tokio::test]
    async fn skip_if_never_starts_providers() {
        let plan = FieldPlan::field("right", |p: &mut Pair, v: String| p.right = Some(v))
            .from(|| async { Err(StudyArcError::Internal("skipped field was fetched".into())) })
            .skip_if(true)
            .into_plan();

        assert!(plan.is_skipped());
        let (_, _, resolution) = plan.resolve().await;
        assert!(matches!(resolution, Resolution::Skipped));
    }

    #[tokio::test]
    async fn static_default_applies_after_remote_failure() {
        let plan = FieldPlan::field("right", |p: &mut Pair, v: String| p.right = Some(v))
            .from(|| async { Err(StudyArcError::Network("offline".into())) })
            .static_default("fallback".to_string())
            .required()
            .into_plan();

        assert!(plan.is_required());
        let mut pair = Pair::default();
        if let (_, _, Resolution::Filled(patch)) = plan.resolve().await {
            patch(&mut pair);
        }
        assert_eq!(pair.right.as_deref(), Some("fallback"));
    }
}
