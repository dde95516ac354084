//! Quiz session wire types

use serde::{Deserialize, Serialize};

/// Kind of quiz session the backend should assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSessionType {
    /// Free practice
    Practice,
    /// The daily morning test
    MorningTest,
    /// Spaced-repetition review of due items
    Review,
    /// Timed mock exam
    Mock,
}

/// Multiple-choice question as served by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question identifier, also the key for its answer
    pub id: String,
    /// Question text
    pub prompt: String,
    /// Choices in display order
    #[serde(default)]
    pub choices: Vec<String>,
    /// Subject category, when the backend tags one
    #[serde(default)]
    pub category: Option<String>,
}

/// Body of the session-start call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Kind of session to assemble
    pub session_type: QuizSessionType,
    /// Number of questions wanted
    pub question_count: u32,
    /// Restrict questions to one category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Session created by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    /// Identifier used by the answer and complete calls
    pub session_id: String,
    /// Questions in the order they are asked
    pub questions: Vec<Question>,
}

/// One answered question, as submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    /// Question being answered
    pub question_id: String,
    /// Selected choice
    pub answer: String,
    /// Time from showing the question to submitting
    pub time_spent_ms: u64,
}

/// Backend response to a submitted answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    /// Whether the answer was right, if the backend reveals it early
    #[serde(default)]
    pub correct: Option<bool>,
}

/// Scored answer within a [`QuizResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    /// Question that was answered
    pub question_id: String,
    /// Choice that was submitted
    pub answer: String,
    /// Whether it was right
    pub correct: bool,
    /// Time spent on the question
    pub time_spent_ms: u64,
}

/// Result returned when a session is completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Session that was scored
    pub session_id: String,
    /// Questions in the session
    pub total_questions: u32,
    /// Questions answered correctly
    pub correct_answers: u32,
    /// Percentage, 0-100
    pub score: f64,
    /// Sum of the per-question times
    #[serde(default)]
    pub total_time_ms: u64,
    /// Per-question breakdown
    #[serde(default)]
    pub outcomes: Vec<QuestionOutcome>,
}
