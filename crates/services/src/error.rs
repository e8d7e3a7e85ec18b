//! Shared error types for the services crate.

use thiserror::Error;

use course_client::ApiError;
use course_core::QuizSessionError;

/// Precondition rejections: user-visible, non-fatal, and never a state
/// transition. These are not logged as errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rejection {
    #[error("this section is locked")]
    SectionLocked,

    #[error("finish all lessons in this section first")]
    LessonsIncomplete,

    #[error("quiz already passed")]
    AlreadyPassed,
}

/// Errors emitted by `LearningFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("no quiz attempt is active")]
    NotTakingQuiz,

    #[error("quiz already in progress")]
    AlreadyTakingQuiz,

    #[error("no graded result to act on")]
    NoResult,

    #[error("lesson does not belong to this course")]
    UnknownLesson,

    #[error("quiz does not belong to this course")]
    UnknownQuiz,

    #[error(transparent)]
    Session(#[from] QuizSessionError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FlowError {
    /// True for user-recoverable conditions (show a notice, stay put), as
    /// opposed to transport failures worth logging. Wrong-phase errors count:
    /// they mean the action arrived out of order, not that anything broke.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FlowError::Rejected(_)
                | FlowError::NotTakingQuiz
                | FlowError::AlreadyTakingQuiz
                | FlowError::NoResult
                | FlowError::Session(
                    QuizSessionError::NoAnswerSelected | QuizSessionError::AtFirstQuestion
                )
        )
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
