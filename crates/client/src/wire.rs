//! Wire payloads and the single normalization boundary.
//!
//! The server speaks camelCase JSON and is not entirely consistent about
//! envelope shapes (progress and attempts arrive either bare or wrapped).
//! All of that tolerance lives here: past this module only canonical domain
//! values exist, and a malformed list payload degrades to empty — which can
//! only ever keep sections locked, never unlock them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;
use uuid::Uuid;

use course_core::model::{
    AnswerId, AttemptId, Course, CourseError, CourseId, Lesson, LessonContent, LessonId,
    ProgressRecord, QuestionId, QuestionKind, QuestionReview, Quiz, QuizAnswer, QuizAttempt,
    QuizError, QuizId, QuizQuestion, QuizResult, Section, SectionId,
};

use crate::error::ApiError;

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

fn parse_url(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::Decode(format!("invalid url {raw:?}: {e}")))
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseDoc {
    id: Uuid,
    title: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sections: Vec<SectionDoc>,
    #[serde(default)]
    quizzes: Vec<QuizDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionDoc {
    id: Uuid,
    title: String,
    sort_order: i32,
    #[serde(default)]
    has_quiz: bool,
    #[serde(default)]
    lessons: Vec<LessonDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonDoc {
    id: Uuid,
    title: String,
    sort_order: i32,
    #[serde(default)]
    free_preview: bool,
    content: ContentDoc,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[serde(rename_all_fields = "camelCase")]
enum ContentDoc {
    Video {
        url: String,
        #[serde(default)]
        duration_secs: Option<u32>,
    },
    Pdf {
        url: String,
    },
    Text {
        body: String,
    },
    Link {
        url: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDoc {
    id: Uuid,
    section_id: Uuid,
    #[serde(default)]
    time_limit: u32,
    passing_score: u8,
    #[serde(default)]
    max_attempts: u32,
}

impl ContentDoc {
    fn into_domain(self) -> Result<LessonContent, ApiError> {
        Ok(match self {
            ContentDoc::Video { url, duration_secs } => LessonContent::Video {
                url: parse_url(&url)?,
                duration_secs,
            },
            ContentDoc::Pdf { url } => LessonContent::Pdf {
                url: parse_url(&url)?,
            },
            ContentDoc::Text { body } => LessonContent::Text { body },
            ContentDoc::Link { url } => LessonContent::ExternalLink {
                url: parse_url(&url)?,
            },
        })
    }
}

impl CourseDoc {
    pub(crate) fn into_domain(self) -> Result<Course, ApiError> {
        let sections = self
            .sections
            .into_iter()
            .map(|s| {
                let lessons = s
                    .lessons
                    .into_iter()
                    .map(|l| {
                        Ok(Lesson::new(
                            LessonId::new(l.id),
                            l.title,
                            l.sort_order,
                            l.free_preview,
                            l.content.into_domain()?,
                        )?)
                    })
                    .collect::<Result<Vec<_>, ApiError>>()?;
                Ok(Section::new(
                    SectionId::new(s.id),
                    s.title,
                    s.sort_order,
                    s.has_quiz,
                    lessons,
                )?)
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        let quizzes = self
            .quizzes
            .into_iter()
            .map(|q| {
                Ok(Quiz::new(
                    QuizId::new(q.id),
                    SectionId::new(q.section_id),
                    q.time_limit,
                    q.passing_score,
                    q.max_attempts,
                )?)
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(Course::new(
            CourseId::new(self.id),
            self.title,
            self.slug,
            self.description,
            sections,
            quizzes,
        )?)
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressDoc {
    lesson_id: Uuid,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    watch_time: u32,
    #[serde(default)]
    last_position: u32,
}

impl ProgressDoc {
    pub(crate) fn into_domain(self) -> ProgressRecord {
        ProgressRecord {
            lesson_id: LessonId::new(self.lesson_id),
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            watch_time_secs: self.watch_time,
            last_position_secs: self.last_position,
        }
    }
}

/// Normalize a progress payload into the canonical flat list.
///
/// Accepts a bare array or `{ "progress": [...] }`; anything else is treated
/// as "no progress" (fail safe to incomplete, never fail open).
pub(crate) fn normalize_progress(value: Value) -> Vec<ProgressRecord> {
    let docs = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("progress") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("progress payload is not a list; treating as no progress");
                return Vec::new();
            }
        },
        _ => {
            warn!("progress payload is not a list; treating as no progress");
            return Vec::new();
        }
    };

    match docs
        .into_iter()
        .map(serde_json::from_value::<ProgressDoc>)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(parsed) => parsed.into_iter().map(ProgressDoc::into_domain).collect(),
        Err(err) => {
            warn!(%err, "malformed progress entries; treating as no progress");
            Vec::new()
        }
    }
}

//
// ─── ATTEMPTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptDoc {
    id: Uuid,
    passed: bool,
    score: f64,
    submitted_at: DateTime<Utc>,
}

impl AttemptDoc {
    fn into_domain(self) -> QuizAttempt {
        QuizAttempt {
            id: AttemptId::new(self.id),
            passed: self.passed,
            score: self.score,
            submitted_at: self.submitted_at,
        }
    }
}

/// Normalize an attempt-history payload (`{ "attempts": [...] }` or a bare
/// array). Malformed input yields an empty history, which keeps the gated
/// section locked.
pub(crate) fn normalize_attempts(value: Value) -> Vec<QuizAttempt> {
    let docs = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("attempts") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("attempts payload is not a list; treating as no attempts");
                return Vec::new();
            }
        },
        _ => {
            warn!("attempts payload is not a list; treating as no attempts");
            return Vec::new();
        }
    };

    match docs
        .into_iter()
        .map(serde_json::from_value::<AttemptDoc>)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(parsed) => parsed.into_iter().map(AttemptDoc::into_domain).collect(),
        Err(err) => {
            warn!(%err, "malformed attempt entries; treating as no attempts");
            Vec::new()
        }
    }
}

//
// ─── QUIZ ATTEMPT LIFECYCLE ────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartAttemptDoc {
    pub attempt_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub questions: Vec<QuestionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDoc {
    id: Uuid,
    prompt: String,
    #[serde(rename = "type")]
    kind: QuestionKindDoc,
    #[serde(default = "default_points")]
    points: u32,
    answers: Vec<AnswerDoc>,
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
enum QuestionKindDoc {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "true-false")]
    TrueFalse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerDoc {
    id: Uuid,
    text: String,
    #[serde(default)]
    is_correct: bool,
}

impl QuestionDoc {
    pub(crate) fn into_domain(self) -> Result<QuizQuestion, ApiError> {
        let kind = match self.kind {
            QuestionKindDoc::MultipleChoice => QuestionKind::MultipleChoice,
            QuestionKindDoc::TrueFalse => QuestionKind::TrueFalse,
        };
        let answers = self
            .answers
            .into_iter()
            .map(|a| QuizAnswer {
                id: AnswerId::new(a.id),
                text: a.text,
                is_correct: a.is_correct,
            })
            .collect();
        Ok(QuizQuestion::new(
            QuestionId::new(self.id),
            self.prompt,
            kind,
            self.points,
            answers,
        )?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitAnswerBody {
    pub answer_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProgressBody {
    pub lesson_id: Uuid,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_position: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizResultDoc {
    score: f64,
    correct_count: u32,
    total_questions: u32,
    passed: bool,
    passing_score: u8,
}

impl QuizResultDoc {
    pub(crate) fn into_domain(self) -> QuizResult {
        QuizResult {
            score: self.score,
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            passed: self.passed,
            passing_score: self.passing_score,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DetailedResultsDoc {
    pub questions: Vec<QuestionReviewDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionReviewDoc {
    question_id: Uuid,
    prompt: String,
    #[serde(default)]
    selected_answer_id: Option<Uuid>,
    #[serde(default)]
    correct_answer_id: Option<Uuid>,
    is_correct: bool,
    #[serde(default)]
    points_earned: u32,
}

impl QuestionReviewDoc {
    pub(crate) fn into_domain(self) -> QuestionReview {
        QuestionReview {
            question_id: QuestionId::new(self.question_id),
            prompt: self.prompt,
            selected_answer_id: self.selected_answer_id.map(AnswerId::new),
            correct_answer_id: self.correct_answer_id.map(AnswerId::new),
            is_correct: self.is_correct,
            points_earned: self.points_earned,
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
