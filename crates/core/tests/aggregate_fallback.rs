//! Integration tests for the primary-then-fallback aggregate fetch

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use studyarc_core::{fetch_aggregate, AggregateSource, FieldPlan};
use studyarc_domain::{
    DashboardData, MorningTest, PredictiveAnalysis, Result as DomainResult, ReviewItem,
    ReviewOverview, StudyArcError, StudyLog, StudyStatistics,
};

fn study_log(id: &str) -> StudyLog {
    StudyLog {
        id: id.to_string(),
        subject: "math".to_string(),
        duration_minutes: 45,
        studied_at: Utc::now(),
        notes: None,
    }
}

fn statistics() -> StudyStatistics {
    StudyStatistics { total_study_minutes: 600, sessions_completed: 12, ..Default::default() }
}

fn offline<T>() -> DomainResult<T> {
    Err(StudyArcError::Network("offline".to_string()))
}

/// Counts how many fallback providers were started
#[derive(Default, Clone)]
struct Calls(Arc<AtomicUsize>);

impl Calls {
    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Five dashboard fallbacks: logs and statistics succeed, the rest fail
fn dashboard_plans(calls: &Calls) -> Vec<FieldPlan<DashboardData>> {
    let (c1, c2, c3, c4, c5) =
        (calls.clone(), calls.clone(), calls.clone(), calls.clone(), calls.clone());
    vec![
        FieldPlan::field("studyLogs", |d: &mut DashboardData, v| d.study_logs = Some(v))
            .from(move || async move {
                c1.hit();
                Ok(vec![study_log("fallback-log")])
            })
            .into_plan(),
        FieldPlan::field("morningTests", |d: &mut DashboardData, v: Vec<MorningTest>| {
            d.morning_tests = Some(v);
        })
        .from(move || async move {
            c2.hit();
            offline()
        })
        .into_plan(),
        FieldPlan::field("predictiveAnalysis", |d: &mut DashboardData, v: PredictiveAnalysis| {
            d.predictive_analysis = Some(v);
        })
        .from(move || async move {
            c3.hit();
            Err(StudyArcError::http(500, "boom"))
        })
        .into_plan(),
        FieldPlan::field("reviewQueue", |d: &mut DashboardData, v: Vec<ReviewItem>| {
            d.review_queue = Some(v);
        })
        .from(move || async move {
            c4.hit();
            Err(StudyArcError::http(404, ""))
        })
        .into_plan(),
        FieldPlan::field("statistics", |d: &mut DashboardData, v| d.statistics = Some(v))
            .from(move || async move {
                c5.hit();
                Ok(statistics())
            })
            .into_plan(),
    ]
}

/// Primary success never starts a fallback, and a null field in the batch
/// payload stays absent.
#[tokio::test]
async fn primary_success_makes_no_fallback_calls() {
    let calls = Calls::default();
    let primary = async {
        Ok(DashboardData {
            study_logs: Some(vec![study_log("l-1"), study_log("l-2")]),
            predictive_analysis: None,
            ..Default::default()
        })
    };

    let outcome = fetch_aggregate("dashboard", primary, dashboard_plans(&calls)).await;

    assert_eq!(outcome.source, AggregateSource::Primary);
    assert_eq!(outcome.data.study_logs.as_ref().map(Vec::len), Some(2));
    assert!(outcome.data.predictive_analysis.is_none());
    assert!(outcome.error.is_none());
    assert_eq!(calls.count(), 0);
}

/// Primary failure runs all five fallbacks; two succeed, three fail, and
/// the successes survive without an error being raised.
#[tokio::test]
async fn fallback_failures_do_not_clobber_siblings() {
    let calls = Calls::default();

    let outcome =
        fetch_aggregate("dashboard", async { offline() }, dashboard_plans(&calls)).await;

    assert_eq!(calls.count(), 5);
    assert_eq!(outcome.source, AggregateSource::Fallback);
    assert!(outcome.is_degraded());
    assert_eq!(outcome.data.study_logs.as_ref().map(|l| l[0].id.as_str()), Some("fallback-log"));
    assert_eq!(outcome.data.statistics.as_ref().map(|s| s.sessions_completed), Some(12));
    assert!(outcome.data.morning_tests.is_none());
    assert!(outcome.data.predictive_analysis.is_none());
    assert!(outcome.data.review_queue.is_none());
    assert_eq!(outcome.failed_fields, vec!["morningTests", "predictiveAnalysis", "reviewQueue"]);
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn required_field_failure_is_summarized_with_partial_data() {
    let plans = vec![
        FieldPlan::field("dueItems", |r: &mut ReviewOverview, v: Vec<ReviewItem>| {
            r.due_items = Some(v);
        })
        .from(|| async { offline() })
        .required()
        .into_plan(),
        FieldPlan::field("statistics", |r: &mut ReviewOverview, v| r.statistics = Some(v))
            .from(|| async { Ok(statistics()) })
            .into_plan(),
    ];

    let outcome =
        fetch_aggregate("review", async { Err(StudyArcError::http(503, "")) }, plans).await;

    assert!(outcome.data.due_items.is_none());
    assert!(outcome.data.statistics.is_some());
    let error = outcome.error.expect("required field failure should be summarized");
    assert!(error.contains("dueItems"));
}

#[tokio::test]
async fn static_default_is_used_only_after_remote_fallback_fails() {
    let remote = Calls::default();
    let counter = remote.clone();
    let plans = vec![FieldPlan::field("statistics", |d: &mut DashboardData, v| {
        d.statistics = Some(v);
    })
    .from(move || async move {
        counter.hit();
        offline()
    })
    .static_default(StudyStatistics::default())
    .into_plan()];

    let outcome = fetch_aggregate("dashboard", async { offline() }, plans).await;

    assert_eq!(remote.count(), 1);
    assert_eq!(outcome.data.statistics, Some(StudyStatistics::default()));
    assert!(outcome.failed_fields.is_empty());
}

#[tokio::test]
async fn skipped_field_is_recorded_without_calls() {
    let calls = Calls::default();
    let counter = calls.clone();
    let plans = vec![
        FieldPlan::field("predictiveAnalysis", |d: &mut DashboardData, v: PredictiveAnalysis| {
            d.predictive_analysis = Some(v);
        })
        .from(move || async move {
            counter.hit();
            offline()
        })
        .skip_if(true)
        .into_plan(),
        FieldPlan::skip("reviewQueue"),
    ];

    let outcome = fetch_aggregate("dashboard", async { offline() }, plans).await;

    assert_eq!(calls.count(), 0);
    assert_eq!(outcome.skipped_fields, vec!["predictiveAnalysis", "reviewQueue"]);
    assert!(outcome.failed_fields.is_empty());
    assert!(outcome.error.is_none());
}

/// Two fetches running at once each build their own aggregate.
#[tokio::test]
async fn concurrent_fetches_do_not_share_state() {
    fn plans(id: &'static str) -> Vec<FieldPlan<DashboardData>> {
        vec![FieldPlan::field("studyLogs", |d: &mut DashboardData, v| d.study_logs = Some(v))
            .from(move || async move {
                tokio::task::yield_now().await;
                Ok(vec![study_log(id)])
            })
            .into_plan()]
    }

    let (left, right) = tokio::join!(
        fetch_aggregate("dashboard", async { offline() }, plans("left")),
        fetch_aggregate("dashboard", async { offline() }, plans("right")),
    );

    let only_id = |data: &DashboardData| {
        data.study_logs.as_ref().map(|logs| logs.iter().map(|l| l.id.clone()).collect::<Vec<_>>())
    };
    assert_eq!(only_id(&left.data), Some(vec!["left".to_string()]));
    assert_eq!(only_id(&right.data), Some(vec!["right".to_string()]));
}
