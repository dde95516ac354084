//! Domain types and models
//!
//! Wire types exchanged with the study service and the read models handed
//! to the UI layer.

pub mod auth;
pub mod metrics;
pub mod quiz;
pub mod study;

pub use auth::{
    AuthEvent, AuthStatus, Credential, CredentialToken, LogoutReason, RefreshResponse,
    RenewalStatus,
};
pub use metrics::CallRecord;
pub use quiz::{
    AnswerFeedback, AnswerSubmission, Question, QuestionOutcome, QuizResult, QuizSessionType,
    StartSessionRequest, StartedSession,
};
pub use study::{
    default_categories, AnalyticsData, DashboardData, MorningTest, PredictiveAnalysis,
    ReviewItem, ReviewOverview, StudyLog, StudyStatistics, SubjectCategory, WeakArea,
};
