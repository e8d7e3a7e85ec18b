use async_trait::async_trait;
use chrono::{DateTime, Utc};

use course_core::model::{
    AnswerId, AttemptId, Course, CourseId, LessonId, ProgressRecord, QuestionId, QuestionReview,
    QuizAttempt, QuizId, QuizQuestion, QuizResult,
};

use crate::error::ApiError;

/// A freshly started attempt: the server mints the attempt id, freezes the
/// question order, and records the start time the countdown is anchored to.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedAttempt {
    pub attempt_id: AttemptId,
    pub questions: Vec<QuizQuestion>,
    pub started_at: DateTime<Utc>,
}

/// Mutation payload for per-lesson progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub lesson_id: LessonId,
    pub is_completed: bool,
    pub watch_time_secs: Option<u32>,
    pub last_position_secs: Option<u32>,
}

impl ProgressUpdate {
    /// Completion-only update, no playback telemetry.
    #[must_use]
    pub fn completed(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            is_completed: true,
            watch_time_secs: None,
            last_position_secs: None,
        }
    }
}

/// The remote system of record, as the learning flow sees it.
///
/// Implementations own transport and payload shape; everything crossing this
/// boundary is already normalized into canonical domain values, so callers
/// never branch on wire shapes.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Fetch the full course snapshot (sections, lessons, quizzes).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown slug, or transport errors.
    async fn fetch_course_by_slug(&self, slug: &str) -> Result<Course, ApiError>;

    /// Fetch the learner's flat per-lesson progress list for a course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure. A malformed payload is not an
    /// error; it normalizes to an empty list.
    async fn fetch_course_progress(&self, course_id: CourseId)
    -> Result<Vec<ProgressRecord>, ApiError>;

    /// Fetch the learner's attempt history for one quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure; callers must treat a failure
    /// as "no passing attempt" (fail-locked).
    async fn fetch_quiz_attempts(&self, quiz_id: QuizId) -> Result<Vec<QuizAttempt>, ApiError>;

    /// Start a new attempt; the server generates the question set and order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a server-side rejection
    /// (e.g. attempt limit reached).
    async fn start_quiz(&self, quiz_id: QuizId) -> Result<StartedAttempt, ApiError>;

    /// Persist one answer selection. Idempotent per question; a later call
    /// for the same question overwrites the earlier one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn submit_answer(
        &self,
        attempt_id: AttemptId,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), ApiError>;

    /// Close the attempt and request grading. The server is the sole
    /// authority on correctness and score.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn submit_quiz(&self, attempt_id: AttemptId) -> Result<QuizResult, ApiError>;

    /// Upsert a lesson progress record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn update_lesson_progress(
        &self,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, ApiError>;

    /// Per-question correctness breakdown of a graded attempt, fetched lazily
    /// when the learner asks to review answers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown attempt, or transport
    /// errors.
    async fn fetch_detailed_results(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<QuestionReview>, ApiError>;
}
