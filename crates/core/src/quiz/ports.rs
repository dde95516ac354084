//! Quiz backend port

use async_trait::async_trait;
use studyarc_domain::{
    AnswerFeedback, AnswerSubmission, QuizResult, Result, StartSessionRequest, StartedSession,
};

/// Remote side of a quiz session
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Create a session and return its questions
    async fn start_session(&self, request: &StartSessionRequest) -> Result<StartedSession>;

    /// Record the answer to one question
    async fn submit_answer(
        &self,
        session_id: &str,
        submission: &AnswerSubmission,
    ) -> Result<AnswerFeedback>;

    /// Close the session and score it
    async fn complete_session(&self, session_id: &str) -> Result<QuizResult>;
}
