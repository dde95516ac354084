//! Quiz session state machine
//!
//! State lives behind a `parking_lot::Mutex` that is never held across an
//! `.await`. Two counters keep concurrent callers honest:
//! - `busy` marks a `start` or `advance` in flight; a second `advance`
//!   during that window is ignored without calling the backend.
//! - `epoch` is bumped by `cancel`; a response that comes back under an
//!   older epoch is discarded instead of applied.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use studyarc_domain::{
    AnswerSubmission, Question, QuizResult, QuizSessionType, Result, StartSessionRequest,
    StudyArcError,
};
use tracing::{debug, info, instrument, warn};

use super::ports::QuizBackend;
use crate::time::{Clock, SystemClock};

/// Live session data while answering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSessionState {
    /// Backend session identifier
    pub session_id: String,
    /// Kind of session that was requested
    pub session_type: QuizSessionType,
    /// Questions in the order they are asked
    pub questions: Vec<Question>,
    /// Always within `0..questions.len()`
    pub current_index: usize,
    /// Selected choice per question id
    pub answers: HashMap<String, String>,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the current question was shown
    pub question_started_at: DateTime<Utc>,
    /// Answers the backend has accepted, in question order
    pub submitted: Vec<AnswerSubmission>,
}

impl QuizSessionState {
    fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }
}

/// Lifecycle of a quiz session
#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    /// No session
    Idle,
    /// Questions are being answered
    InProgress(QuizSessionState),
    /// Scored result of the finished session
    Completed(QuizResult),
}

impl QuizPhase {
    /// Phase without its payload
    pub const fn kind(&self) -> QuizPhaseKind {
        match self {
            Self::Idle => QuizPhaseKind::Idle,
            Self::InProgress(_) => QuizPhaseKind::InProgress,
            Self::Completed(_) => QuizPhaseKind::Completed,
        }
    }
}

/// Payload-free [`QuizPhase`] for views and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhaseKind {
    /// No session
    Idle,
    /// Questions are being answered
    InProgress,
    /// The session has been scored
    Completed,
}

/// Result of [`QuizSessionMachine::start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session is in progress
    Started {
        /// Backend session identifier
        session_id: String,
        /// Number of questions the backend returned
        total_questions: usize,
    },
    /// The session was cancelled while the request was in flight
    Discarded,
}

/// Result of [`QuizSessionMachine::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved on to the question at `index`
    Advanced { index: usize },
    /// The last answer was accepted and the session scored
    Completed(QuizResult),
    /// Another request was still in flight; nothing was sent
    Ignored,
    /// The session was cancelled while the request was in flight
    Discarded,
}

/// Read model for the quiz screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    /// Current phase
    pub phase: QuizPhaseKind,
    /// Backend session id while a session exists
    pub session_id: Option<String>,
    /// Question on screen
    pub current_question: Option<Question>,
    /// Zero-based index of the question on screen
    pub current_index: usize,
    /// Number of questions in the session
    pub total_questions: usize,
    /// Choice selected for the question on screen
    pub selected_answer: Option<String>,
    /// Position through the session, 0.0 to 1.0
    pub progress: f64,
    /// Whether a backend request is in flight
    pub busy: bool,
    /// Scored result once completed
    pub result: Option<QuizResult>,
    /// Message of the last failed request
    pub error: Option<String>,
}

#[derive(Debug)]
struct Inner {
    phase: QuizPhase,
    epoch: u64,
    busy: bool,
    last_error: Option<String>,
}

/// Clears `busy` on every exit path, unless a cancel already moved on
struct InFlight {
    inner: Arc<Mutex<Inner>>,
    epoch: u64,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.epoch == self.epoch {
            inner.busy = false;
        }
    }
}

/// Drives one quiz session at a time
pub struct QuizSessionMachine {
    backend: Arc<dyn QuizBackend>,
    clock: Arc<dyn Clock>,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for QuizSessionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSessionMachine")
            .field("inner", &*self.inner.lock())
            .finish_non_exhaustive()
    }
}

impl QuizSessionMachine {
    /// Idle machine driving `backend`
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    /// Like [`QuizSessionMachine::new`] with an explicit clock for answer timing
    pub fn with_clock(backend: Arc<dyn QuizBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            inner: Arc::new(Mutex::new(Inner {
                phase: QuizPhase::Idle,
                epoch: 0,
                busy: false,
                last_error: None,
            })),
        }
    }

    /// Copy of the current phase
    pub fn phase(&self) -> QuizPhase {
        self.inner.lock().phase.clone()
    }

    /// Whether a backend request is in flight
    pub fn is_busy(&self) -> bool {
        self.inner.lock().busy
    }

    /// Ask the backend for a new session.
    ///
    /// On error the previous state is kept and the error is returned; its
    /// [`StudyArcError::user_message`] is also exposed through [`Self::view`].
    #[instrument(skip(self, category))]
    pub async fn start(
        &self,
        session_type: QuizSessionType,
        question_count: u32,
        category: Option<String>,
    ) -> Result<StartOutcome> {
        if question_count == 0 {
            return Err(StudyArcError::Validation(
                "Question count must be greater than zero".to_string(),
            ));
        }

        let epoch = {
            let mut inner = self.inner.lock();
            if inner.busy {
                return Err(StudyArcError::Validation(
                    "A quiz request is already in progress".to_string(),
                ));
            }
            if matches!(inner.phase, QuizPhase::InProgress(_)) {
                return Err(StudyArcError::Validation(
                    "A quiz session is already in progress".to_string(),
                ));
            }
            inner.busy = true;
            inner.epoch
        };
        let _in_flight = InFlight { inner: Arc::clone(&self.inner), epoch };

        let request = StartSessionRequest { session_type, question_count, category };
        let response = self.backend.start_session(&request).await;

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            debug!("discarding start response for cancelled session");
            return Ok(StartOutcome::Discarded);
        }

        let session = match response {
            Ok(session) if session.questions.is_empty() => {
                let err = StudyArcError::Application(
                    "The quiz session has no questions".to_string(),
                );
                inner.last_error = Some(err.user_message());
                return Err(err);
            }
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "failed to start quiz session");
                inner.last_error = Some(err.user_message());
                return Err(err);
            }
        };

        let now = self.clock.now();
        let total_questions = session.questions.len();
        info!(session_id = %session.session_id, total_questions, "quiz session started");

        let outcome =
            StartOutcome::Started { session_id: session.session_id.clone(), total_questions };
        inner.phase = QuizPhase::InProgress(QuizSessionState {
            session_id: session.session_id,
            session_type,
            questions: session.questions,
            current_index: 0,
            answers: HashMap::new(),
            started_at: now,
            question_started_at: now,
            submitted: Vec::new(),
        });
        inner.last_error = None;
        Ok(outcome)
    }

    /// Record `choice` for the current question. Returns whether anything
    /// was recorded.
    pub fn select_answer(&self, choice: impl Into<String>) -> bool {
        let mut inner = self.inner.lock();
        let QuizPhase::InProgress(state) = &mut inner.phase else {
            return false;
        };
        let Some(question_id) = state.current_question().map(|q| q.id.clone()) else {
            return false;
        };
        state.answers.insert(question_id, choice.into());
        true
    }

    /// Submit the current answer and move on, completing the session after
    /// the last question.
    ///
    /// Nothing changes on failure; calling again retries the same step. If
    /// the last answer was accepted but completion failed, the retry only
    /// completes.
    #[instrument(skip(self))]
    pub async fn advance(&self) -> Result<AdvanceOutcome> {
        let (epoch, session_id, submission, is_last) = {
            let mut inner = self.inner.lock();
            if inner.busy {
                debug!("advance ignored while a request is in flight");
                return Ok(AdvanceOutcome::Ignored);
            }
            let QuizPhase::InProgress(state) = &inner.phase else {
                return Err(StudyArcError::Validation("No quiz session in progress".to_string()));
            };
            let Some(question) = state.current_question() else {
                return Err(StudyArcError::Internal("Quiz index out of range".to_string()));
            };
            let Some(answer) = state.answers.get(&question.id) else {
                return Err(StudyArcError::Validation("Please select an answer".to_string()));
            };

            let submission = (state.submitted.len() <= state.current_index).then(|| {
                let elapsed = self.clock.now() - state.question_started_at;
                AnswerSubmission {
                    question_id: question.id.clone(),
                    answer: answer.clone(),
                    time_spent_ms: u64::try_from(elapsed.num_milliseconds()).unwrap_or(0),
                }
            });
            let prepared = (inner.epoch, state.session_id.clone(), submission, state.is_last());
            inner.busy = true;
            prepared
        };
        let _in_flight = InFlight { inner: Arc::clone(&self.inner), epoch };

        if let Some(submission) = submission {
            let response = self.backend.submit_answer(&session_id, &submission).await;

            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                debug!("discarding answer response for cancelled session");
                return Ok(AdvanceOutcome::Discarded);
            }
            if let Err(err) = response {
                warn!(
                    error = %err,
                    question_id = %submission.question_id,
                    "answer submission failed"
                );
                inner.last_error = Some(err.user_message());
                return Err(err);
            }

            let now = self.clock.now();
            let QuizPhase::InProgress(state) = &mut inner.phase else {
                return Ok(AdvanceOutcome::Discarded);
            };
            state.submitted.push(submission);
            if !is_last {
                state.current_index += 1;
                state.question_started_at = now;
                let index = state.current_index;
                inner.last_error = None;
                return Ok(AdvanceOutcome::Advanced { index });
            }
        }

        let response = self.backend.complete_session(&session_id).await;

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            debug!("discarding completion for cancelled session");
            return Ok(AdvanceOutcome::Discarded);
        }
        match response {
            Ok(result) => {
                info!(
                    session_id = %session_id,
                    score = result.score,
                    correct = result.correct_answers,
                    "quiz session completed"
                );
                inner.phase = QuizPhase::Completed(result.clone());
                inner.last_error = None;
                Ok(AdvanceOutcome::Completed(result))
            }
            Err(err) => {
                warn!(error = %err, session_id = %session_id, "quiz completion failed");
                inner.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Abandon whatever is going on and return to `Idle`. Responses still in
    /// flight are discarded when they arrive.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.busy = false;
        inner.last_error = None;
        if !matches!(inner.phase, QuizPhase::Idle) {
            debug!(epoch = inner.epoch, "quiz session cancelled");
        }
        inner.phase = QuizPhase::Idle;
    }

    /// Leave a finished session
    pub fn reset(&self) {
        self.cancel();
    }

    /// Snapshot for rendering the quiz screen
    pub fn view(&self) -> QuizView {
        let inner = self.inner.lock();
        let mut view = QuizView {
            phase: inner.phase.kind(),
            session_id: None,
            current_question: None,
            current_index: 0,
            total_questions: 0,
            selected_answer: None,
            progress: 0.0,
            busy: inner.busy,
            result: None,
            error: inner.last_error.clone(),
        };

        match &inner.phase {
            QuizPhase::Idle => {}
            QuizPhase::InProgress(state) => {
                let total = state.questions.len();
                let question = state.current_question().cloned();
                view.selected_answer =
                    question.as_ref().and_then(|q| state.answers.get(&q.id).cloned());
                view.session_id = Some(state.session_id.clone());
                view.current_question = question;
                view.current_index = state.current_index;
                view.total_questions = total;
                view.progress = progress(state.current_index + 1, total);
            }
            QuizPhase::Completed(result) => {
                view.session_id = Some(result.session_id.clone());
                view.total_questions = result.total_questions as usize;
                view.progress = 1.0;
                view.result = Some(result.clone());
            }
        }
        view
    }
}

fn progress(position: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let position = u32::try_from(position.min(total)).unwrap_or(u32::MAX);
    let total = u32::try_from(total).unwrap_or(u32::MAX);
    f64::from(position) / f64::from(total)
}
