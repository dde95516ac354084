//! Study data and per-screen aggregates
//!
//! Aggregate structs mirror the batch endpoints: every field is optional and
//! `None` means its source failed or was skipped, never "still loading".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged study period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLog {
    /// Log identifier
    pub id: String,
    /// Subject studied
    pub subject: String,
    /// Length of the period
    pub duration_minutes: u32,
    /// When the period started
    pub studied_at: DateTime<Utc>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// A completed morning test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorningTest {
    /// Test identifier
    pub id: String,
    /// When the test was taken
    pub taken_at: DateTime<Utc>,
    /// Percentage, 0-100
    pub score: f64,
    /// Questions in the test
    pub total_questions: u32,
}

/// Score forecast, only served to signed-in users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveAnalysis {
    /// Expected exam score, 0-100
    pub predicted_score: f64,
    /// 0.0 - 1.0
    pub confidence: f64,
    /// Suggested next steps
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// A spaced-repetition item that is due for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    /// Review item identifier
    pub id: String,
    /// Question to review
    pub question_id: String,
    /// Subject of the question
    pub subject: String,
    /// When the item became due
    pub due_at: DateTime<Utc>,
    /// Current repetition interval
    pub interval_days: u32,
    /// SM-2 ease factor
    pub ease_factor: f64,
    /// Successful reviews so far
    pub repetitions: u32,
}

/// Totals across all study activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyStatistics {
    /// Minutes logged in total
    pub total_study_minutes: u64,
    /// Quiz sessions finished
    pub sessions_completed: u32,
    /// Mean quiz score, 0-100
    pub average_score: f64,
    /// Consecutive days with study activity
    pub current_streak_days: u32,
}

/// Category where answers are often wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakArea {
    /// Category identifier
    pub category: String,
    /// 0.0 - 1.0
    pub accuracy: f64,
    /// Questions answered in the category
    pub attempts: u32,
}

/// Subject category offered when starting a quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCategory {
    /// Identifier sent in quiz requests
    pub id: String,
    /// Display name
    pub name: String,
}

/// Built-in subject catalogue used when the categories endpoint is down
pub fn default_categories() -> Vec<SubjectCategory> {
    [
        ("math", "Mathematics"),
        ("science", "Science"),
        ("english", "English"),
        ("history", "History"),
        ("general", "General Knowledge"),
    ]
    .into_iter()
    .map(|(id, name)| SubjectCategory { id: id.to_string(), name: name.to_string() })
    .collect()
}

/// Dashboard screen aggregate (`/dashboard/batch`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    /// Recent study logs
    pub study_logs: Option<Vec<StudyLog>>,
    /// Recent morning tests
    pub morning_tests: Option<Vec<MorningTest>>,
    /// Score forecast; skipped for anonymous users
    pub predictive_analysis: Option<PredictiveAnalysis>,
    /// Items due for review
    pub review_queue: Option<Vec<ReviewItem>>,
    /// Overall totals
    pub statistics: Option<StudyStatistics>,
}

/// Analytics screen aggregate (`/analytics/batch`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsData {
    /// Overall totals
    pub statistics: Option<StudyStatistics>,
    /// Categories with low accuracy
    pub weak_areas: Option<Vec<WeakArea>>,
    /// Study history
    pub study_logs: Option<Vec<StudyLog>>,
    /// Subject catalogue, built-in when the endpoint fails
    pub categories: Option<Vec<SubjectCategory>>,
}

/// Spaced-repetition review screen aggregate (`/reviews/batch`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewOverview {
    /// Items due now; the screen cannot render without them
    pub due_items: Option<Vec<ReviewItem>>,
    /// Overall totals
    pub statistics: Option<StudyStatistics>,
}
