//! Scripted quiz backend

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use studyarc_core::QuizBackend;
use studyarc_domain::{
    AnswerFeedback, AnswerSubmission, Question, QuizResult, Result as DomainResult,
    StartSessionRequest, StartedSession, StudyArcError,
};
use tokio::sync::Notify;

pub fn questions(count: usize) -> Vec<Question> {
    (1..=count)
        .map(|n| Question {
            id: format!("q-{n}"),
            prompt: format!("Question {n}"),
            choices: vec!["a".into(), "b".into(), "c".into()],
            category: None,
        })
        .collect()
}

#[derive(Default)]
struct Failures {
    start: Option<StudyArcError>,
    submit: Option<StudyArcError>,
    complete: Option<StudyArcError>,
}

/// Backend serving a fixed question set; failures are one-shot
pub struct ScriptedQuizBackend {
    questions: Vec<Question>,
    failures: Mutex<Failures>,
    submissions: Mutex<Vec<AnswerSubmission>>,
    start_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedQuizBackend {
    pub fn with_questions(count: usize) -> Arc<Self> {
        Arc::new(Self {
            questions: questions(count),
            failures: Mutex::new(Failures::default()),
            submissions: Mutex::new(Vec::new()),
            start_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            hold: Mutex::new(None),
        })
    }

    pub fn fail_next_start(&self, err: StudyArcError) {
        self.failures.lock().start = Some(err);
    }

    pub fn fail_next_submit(&self, err: StudyArcError) {
        self.failures.lock().submit = Some(err);
    }

    pub fn fail_next_complete(&self, err: StudyArcError) {
        self.failures.lock().complete = Some(err);
    }

    /// Park every backend call until the returned handle is notified
    pub fn hold_calls(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn release(&self) {
        if let Some(gate) = self.hold.lock().take() {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    pub fn submissions(&self) -> Vec<AnswerSubmission> {
        self.submissions.lock().clone()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    async fn wait_if_held(&self) {
        let gate = self.hold.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl QuizBackend for ScriptedQuizBackend {
    async fn start_session(&self, request: &StartSessionRequest) -> DomainResult<StartedSession> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held().await;
        if let Some(err) = self.failures.lock().start.take() {
            return Err(err);
        }
        let count = usize::try_from(request.question_count).unwrap_or(usize::MAX);
        Ok(StartedSession {
            session_id: "session-1".to_string(),
            questions: self.questions.iter().take(count).cloned().collect(),
        })
    }

    async fn submit_answer(
        &self,
        _session_id: &str,
        submission: &AnswerSubmission,
    ) -> DomainResult<AnswerFeedback> {
        self.wait_if_held().await;
        if let Some(err) = self.failures.lock().submit.take() {
            return Err(err);
        }
        self.submissions.lock().push(submission.clone());
        Ok(AnswerFeedback { correct: Some(submission.answer == "a") })
    }

    async fn complete_session(&self, session_id: &str) -> DomainResult<QuizResult> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held().await;
        if let Some(err) = self.failures.lock().complete.take() {
            return Err(err);
        }
        let submissions = self.submissions.lock().clone();
        let correct = submissions.iter().filter(|s| s.answer == "a").count();
        let total = submissions.len().max(1);
        Ok(QuizResult {
            session_id: session_id.to_string(),
            total_questions: u32::try_from(submissions.len()).unwrap_or(u32::MAX),
            correct_answers: u32::try_from(correct).unwrap_or(u32::MAX),
            score: (correct as f64 / total as f64) * 100.0,
            total_time_ms: submissions.iter().map(|s| s.time_spent_ms).sum(),
            outcomes: Vec::new(),
        })
    }
}
