use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{AnswerId, AttemptId, QuestionId, QuizId, SectionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("passing score must be between 0 and 100, got {0}")]
    InvalidPassingScore(u8),

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must offer at least one answer")]
    NoAnswers,

    #[error("true/false question must offer exactly two answers, got {0}")]
    InvalidTrueFalseAnswers(usize),
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A section-gating quiz summary as announced inside the course payload.
///
/// Questions are *not* part of this snapshot; the server reveals them only
/// when an attempt is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    section_id: SectionId,
    time_limit_minutes: u32,
    passing_score: u8,
    max_attempts: u32,
}

impl Quiz {
    /// Create a quiz summary. A `time_limit_minutes` of zero means untimed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidPassingScore` if the score is over 100.
    pub fn new(
        id: QuizId,
        section_id: SectionId,
        time_limit_minutes: u32,
        passing_score: u8,
        max_attempts: u32,
    ) -> Result<Self, QuizError> {
        if passing_score > 100 {
            return Err(QuizError::InvalidPassingScore(passing_score));
        }
        Ok(Self {
            id,
            section_id,
            time_limit_minutes,
            passing_score,
            max_attempts,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn section_id(&self) -> SectionId {
        self.section_id
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.time_limit_minutes > 0
    }

    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    /// Mirrored from the server for display; not enforced client-side.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
}

/// One answer option of a question. `is_correct` is server-trusted and only
/// used for result review, never for local grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnswer {
    pub id: AnswerId,
    pub text: String,
    pub is_correct: bool,
}

/// A question revealed by a started attempt, with its frozen answer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuestionId,
    prompt: String,
    kind: QuestionKind,
    points: u32,
    answers: Vec<QuizAnswer>,
}

impl QuizQuestion {
    /// Create a question snapshot.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPrompt` / `QuizError::NoAnswers` on blank
    /// input, and `QuizError::InvalidTrueFalseAnswers` when a true/false
    /// question does not carry exactly two options.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        kind: QuestionKind,
        points: u32,
        answers: Vec<QuizAnswer>,
    ) -> Result<Self, QuizError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuizError::EmptyPrompt);
        }
        if answers.is_empty() {
            return Err(QuizError::NoAnswers);
        }
        if kind == QuestionKind::TrueFalse && answers.len() != 2 {
            return Err(QuizError::InvalidTrueFalseAnswers(answers.len()));
        }
        Ok(Self {
            id,
            prompt,
            kind,
            points,
            answers,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn answers(&self) -> &[QuizAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn has_answer(&self, id: AnswerId) -> bool {
        self.answers.iter().any(|a| a.id == id)
    }
}

//
// ─── ATTEMPTS & RESULTS ────────────────────────────────────────────────────────
//

/// One completed submission of a quiz, as recorded by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub passed: bool,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// Server-graded outcome of a submitted attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    pub passed: bool,
    pub passing_score: u8,
}

/// Per-question correctness breakdown, fetched lazily when the learner asks
/// to review a graded attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub prompt: String,
    pub selected_answer_id: Option<AnswerId>,
    pub correct_answer_id: Option<AnswerId>,
    pub is_correct: bool,
    pub points_earned: u32,
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn answer(n: u128, is_correct: bool) -> QuizAnswer {
        QuizAnswer {
            id: AnswerId::new(Uuid::from_u128(n)),
            text: format!("answer {n}"),
            is_correct,
        }
    }

    #[test]
    fn passing_score_over_100_rejected() {
        let err = Quiz::new(
            QuizId::new(Uuid::from_u128(1)),
            SectionId::new(Uuid::from_u128(2)),
            0,
            101,
            1,
        )
        .unwrap_err();
        assert_eq!(err, QuizError::InvalidPassingScore(101));
    }

    #[test]
    fn zero_time_limit_means_untimed() {
        let quiz = Quiz::new(
            QuizId::new(Uuid::from_u128(1)),
            SectionId::new(Uuid::from_u128(2)),
            0,
            70,
            3,
        )
        .unwrap();
        assert!(!quiz.is_timed());
    }

    #[test]
    fn true_false_requires_two_answers() {
        let err = QuizQuestion::new(
            QuestionId::new(Uuid::from_u128(1)),
            "Rust has a garbage collector.",
            QuestionKind::TrueFalse,
            1,
            vec![answer(1, false)],
        )
        .unwrap_err();
        assert_eq!(err, QuizError::InvalidTrueFalseAnswers(1));
    }

    #[test]
    fn question_knows_its_answers() {
        let q = QuizQuestion::new(
            QuestionId::new(Uuid::from_u128(1)),
            "Pick one",
            QuestionKind::MultipleChoice,
            2,
            vec![answer(1, true), answer(2, false)],
        )
        .unwrap();
        assert!(q.has_answer(AnswerId::new(Uuid::from_u128(2))));
        assert!(!q.has_answer(AnswerId::new(Uuid::from_u128(9))));
    }
}
