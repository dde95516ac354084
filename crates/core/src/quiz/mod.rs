//! Quiz session state machine
//!
//! `Idle -> InProgress -> Completed`, driven by [`QuizSessionMachine`]
//! against a [`QuizBackend`].

pub mod machine;
pub mod ports;

pub use machine::{
    AdvanceOutcome, QuizPhase, QuizPhaseKind, QuizSessionMachine, QuizSessionState, QuizView,
    StartOutcome,
};
pub use ports::QuizBackend;
