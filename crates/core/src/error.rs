use thiserror::Error;

use crate::model::{CourseError, QuizError};
use crate::quiz_session::QuizSessionError;

/// Crate-level error union for callers that do not care which model layer
/// rejected their input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    QuizSession(#[from] QuizSessionError),
}
