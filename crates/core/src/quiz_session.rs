//! In-memory state of one active quiz attempt.
//!
//! The session only exists between "start quiz" and "submit"; grading is the
//! server's job, the session just tracks the learner's position, their one
//! selected answer per question, and the wall-clock countdown.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{AnswerId, AttemptId, QuestionId, Quiz, QuizQuestion};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("attempt has no questions")]
    NoQuestions,

    #[error("select an answer before continuing")]
    NoAnswerSelected,

    #[error("answer does not belong to the current question")]
    UnknownAnswer,

    #[error("already at the first question")]
    AtFirstQuestion,
}

/// Outcome of a forward navigation within the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Moved,
    /// Already on the last question; forward navigation means submission.
    ReadyToSubmit,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// An active attempt: the server-frozen question order, a cursor over it, and
/// the locally recorded answers (persisted upstream as they are selected).
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    attempt_id: AttemptId,
    quiz: Quiz,
    questions: Vec<QuizQuestion>,
    current: usize,
    selected: HashMap<QuestionId, AnswerId>,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Create a session for a freshly started attempt.
    ///
    /// `started_at` is the server-recorded start of the attempt; the
    /// countdown is anchored to it, not to any local timer.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoQuestions` if the server sent an empty
    /// question set.
    pub fn new(
        attempt_id: AttemptId,
        quiz: Quiz,
        questions: Vec<QuizQuestion>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        if questions.is_empty() {
            return Err(QuizSessionError::NoQuestions);
        }
        Ok(Self {
            attempt_id,
            quiz,
            questions,
            current: 0,
            selected: HashMap::new(),
            started_at,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// 1-based index of the current question, for display.
    #[must_use]
    pub fn current_number(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn current_question(&self) -> &QuizQuestion {
        // `new` guarantees a non-empty set and navigation never leaves it.
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn selected_answer(&self, question_id: QuestionId) -> Option<AnswerId> {
        self.selected.get(&question_id).copied()
    }

    /// All recorded (question, answer) pairs, for submission.
    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, AnswerId> {
        &self.selected
    }

    /// Record the learner's choice for the current question, replacing any
    /// earlier choice. One answer per question, no multi-select.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::UnknownAnswer` if the answer id is not an
    /// option of the current question.
    pub fn select_answer(&mut self, answer_id: AnswerId) -> Result<(), QuizSessionError> {
        let question = self.current_question();
        if !question.has_answer(answer_id) {
            return Err(QuizSessionError::UnknownAnswer);
        }
        self.selected.insert(question.id(), answer_id);
        Ok(())
    }

    /// Move forward. Requires a recorded answer for the current question; on
    /// the last question the session does not advance but signals that
    /// forward navigation now means submission.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoAnswerSelected` if the current question
    /// has no recorded answer.
    pub fn advance(&mut self) -> Result<Advance, QuizSessionError> {
        let question_id = self.current_question().id();
        if !self.selected.contains_key(&question_id) {
            return Err(QuizSessionError::NoAnswerSelected);
        }
        if self.current + 1 >= self.questions.len() {
            return Ok(Advance::ReadyToSubmit);
        }
        self.current += 1;
        Ok(Advance::Moved)
    }

    /// Move backward. Unconditional, except at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AtFirstQuestion` when there is nothing
    /// before the current question.
    pub fn go_back(&mut self) -> Result<(), QuizSessionError> {
        if self.current == 0 {
            return Err(QuizSessionError::AtFirstQuestion);
        }
        self.current -= 1;
        Ok(())
    }

    //
    // ─── COUNTDOWN ─────────────────────────────────────────────────────────
    //

    /// Seconds left on the attempt, derived from the wall clock each call so
    /// the countdown self-corrects across tab suspension. `None` for untimed
    /// quizzes; clamped at zero once the limit is spent.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.quiz.is_timed() {
            return None;
        }
        let limit = i64::from(self.quiz.time_limit_minutes()) * 60;
        let elapsed = (now - self.started_at).num_seconds();
        Some((limit - elapsed).max(0))
    }

    /// True once a timed attempt's countdown has reached zero.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_seconds(now) == Some(0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
