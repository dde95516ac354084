//! Endpoint bindings for the study service
//!
//! [`StudyApi`] implements the core ports that talk to the service
//! ([`QuizBackend`], [`TokenRefresher`]) and assembles the per-screen
//! aggregates with their fallback plans.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use studyarc_core::aggregate::{provider, Provider};
use studyarc_core::{fetch_aggregate, AggregateOutcome, FieldPlan, QuizBackend, TokenRefresher};
use studyarc_domain::{
    default_categories, AnalyticsData, AnswerFeedback, AnswerSubmission, DashboardData,
    MorningTest, PredictiveAnalysis, QuizResult, RefreshResponse, Result, ReviewItem,
    ReviewOverview, StartSessionRequest, StartedSession, StudyLog, StudyStatistics,
    SubjectCategory, WeakArea, ENDPOINT_ANALYTICS_BATCH, ENDPOINT_AUTH_REFRESH,
    ENDPOINT_CATEGORIES, ENDPOINT_DASHBOARD_BATCH, ENDPOINT_MORNING_TESTS,
    ENDPOINT_PREDICTIVE_ANALYSIS, ENDPOINT_QUIZ_SESSIONS, ENDPOINT_REVIEWS_DUE,
    ENDPOINT_REVIEW_BATCH, ENDPOINT_STATISTICS, ENDPOINT_STUDY_LOGS, ENDPOINT_WEAK_AREAS,
};
use tracing::instrument;

use crate::gateway::Gateway;

/// Typed access to the study service
#[derive(Debug, Clone)]
pub struct StudyApi {
    gateway: Arc<Gateway>,
}

impl StudyApi {
    /// Bindings over `gateway`
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Underlying gateway
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Study history, newest first
    pub async fn study_logs(&self) -> Result<Vec<StudyLog>> {
        self.gateway.get(ENDPOINT_STUDY_LOGS).await
    }

    /// Morning test results
    pub async fn morning_tests(&self) -> Result<Vec<MorningTest>> {
        self.gateway.get(ENDPOINT_MORNING_TESTS).await
    }

    /// Score forecast; `None` when the service has none yet
    pub async fn predictive_analysis(&self) -> Result<Option<PredictiveAnalysis>> {
        self.gateway.get(ENDPOINT_PREDICTIVE_ANALYSIS).await
    }

    /// Spaced-repetition cards due now
    pub async fn due_reviews(&self) -> Result<Vec<ReviewItem>> {
        self.gateway.get(ENDPOINT_REVIEWS_DUE).await
    }

    /// Overall study totals
    pub async fn statistics(&self) -> Result<StudyStatistics> {
        self.gateway.get(ENDPOINT_STATISTICS).await
    }

    /// Categories with low accuracy
    pub async fn weak_areas(&self) -> Result<Vec<WeakArea>> {
        self.gateway.get(ENDPOINT_WEAK_AREAS).await
    }

    /// Subject catalogue from the service
    pub async fn categories(&self) -> Result<Vec<SubjectCategory>> {
        self.gateway.get(ENDPOINT_CATEGORIES).await
    }

    /// Dashboard data; predictive analysis is only fetched for signed-in
    /// users.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> AggregateOutcome<DashboardData> {
        let signed_in = self.gateway.auth_snapshot().is_authenticated();

        let plans = vec![
            FieldPlan::field("studyLogs", |d: &mut DashboardData, v| d.study_logs = Some(v))
                .provider(self.remote(ENDPOINT_STUDY_LOGS))
                .into_plan(),
            FieldPlan::field("morningTests", |d: &mut DashboardData, v| d.morning_tests = Some(v))
                .provider(self.remote(ENDPOINT_MORNING_TESTS))
                .into_plan(),
            FieldPlan::field("predictiveAnalysis", |d: &mut DashboardData, v| {
                d.predictive_analysis = v;
            })
            .provider(self.remote::<Option<PredictiveAnalysis>>(ENDPOINT_PREDICTIVE_ANALYSIS))
            .skip_if(!signed_in)
            .into_plan(),
            FieldPlan::field("reviewQueue", |d: &mut DashboardData, v| d.review_queue = Some(v))
                .provider(self.remote(ENDPOINT_REVIEWS_DUE))
                .into_plan(),
            FieldPlan::field("statistics", |d: &mut DashboardData, v| d.statistics = Some(v))
                .provider(self.remote(ENDPOINT_STATISTICS))
                .into_plan(),
        ];

        fetch_aggregate("dashboard", self.gateway.get(ENDPOINT_DASHBOARD_BATCH), plans).await
    }

    /// Analytics data; categories fall back to the built-in catalogue.
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> AggregateOutcome<AnalyticsData> {
        let plans = vec![
            FieldPlan::field("statistics", |a: &mut AnalyticsData, v| a.statistics = Some(v))
                .provider(self.remote(ENDPOINT_STATISTICS))
                .into_plan(),
            FieldPlan::field("weakAreas", |a: &mut AnalyticsData, v| a.weak_areas = Some(v))
                .provider(self.remote(ENDPOINT_WEAK_AREAS))
                .into_plan(),
            FieldPlan::field("studyLogs", |a: &mut AnalyticsData, v| a.study_logs = Some(v))
                .provider(self.remote(ENDPOINT_STUDY_LOGS))
                .into_plan(),
            FieldPlan::field("categories", |a: &mut AnalyticsData, v| a.categories = Some(v))
                .provider(self.remote(ENDPOINT_CATEGORIES))
                .static_default(default_categories())
                .into_plan(),
        ];

        fetch_aggregate("analytics", self.gateway.get(ENDPOINT_ANALYTICS_BATCH), plans).await
    }

    /// Review screen data; the due list is required.
    #[instrument(skip(self))]
    pub async fn review_overview(&self) -> AggregateOutcome<ReviewOverview> {
        let plans = vec![
            FieldPlan::field("dueItems", |r: &mut ReviewOverview, v| r.due_items = Some(v))
                .provider(self.remote(ENDPOINT_REVIEWS_DUE))
                .required()
                .into_plan(),
            FieldPlan::field("statistics", |r: &mut ReviewOverview, v| r.statistics = Some(v))
                .provider(self.remote(ENDPOINT_STATISTICS))
                .into_plan(),
        ];

        fetch_aggregate("review", self.gateway.get(ENDPOINT_REVIEW_BATCH), plans).await
    }

    fn remote<V>(&self, endpoint: &'static str) -> Provider<V>
    where
        V: DeserializeOwned + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        provider(move || async move { gateway.get::<V>(endpoint).await })
    }
}

#[async_trait]
impl QuizBackend for StudyApi {
    async fn start_session(&self, request: &StartSessionRequest) -> Result<StartedSession> {
        self.gateway.post(ENDPOINT_QUIZ_SESSIONS, request).await
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        submission: &AnswerSubmission,
    ) -> Result<AnswerFeedback> {
        let endpoint = format!("{ENDPOINT_QUIZ_SESSIONS}/{session_id}/answers");
        self.gateway.post(&endpoint, submission).await
    }

    async fn complete_session(&self, session_id: &str) -> Result<QuizResult> {
        let endpoint = format!("{ENDPOINT_QUIZ_SESSIONS}/{session_id}/complete");
        self.gateway.post(&endpoint, &serde_json::json!({})).await
    }
}

#[async_trait]
impl TokenRefresher for StudyApi {
    /// Relies on the session cookie; the gateway adds the stored bearer
    /// token as a fallback when there is one.
    async fn refresh(&self) -> Result<RefreshResponse> {
        let response: Option<RefreshResponse> =
            self.gateway.post(ENDPOINT_AUTH_REFRESH, &serde_json::json!({})).await?;
        Ok(response.unwrap_or_default())
    }
}
