use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, LessonId, QuizId, SectionId};
use crate::model::quiz::Quiz;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course slug cannot be empty")]
    EmptySlug,

    #[error("section title cannot be empty")]
    EmptySectionTitle,

    #[error("lesson title cannot be empty")]
    EmptyLessonTitle,

    #[error("more than one quiz references section {section_id}")]
    DuplicateSectionQuiz { section_id: SectionId },
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// The playable payload of a lesson, tagged by media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonContent {
    Video {
        url: Url,
        duration_secs: Option<u32>,
    },
    Pdf {
        url: Url,
    },
    Text {
        body: String,
    },
    ExternalLink {
        url: Url,
    },
}

/// A single lesson inside a section.
///
/// Lessons are read-only snapshots mirrored from the server; completion state
/// lives in separate `ProgressRecord`s, never on the lesson itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    sort_order: i32,
    free_preview: bool,
    content: LessonContent,
}

impl Lesson {
    /// Create a lesson snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyLessonTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        sort_order: i32,
        free_preview: bool,
        content: LessonContent,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyLessonTitle);
        }
        Ok(Self {
            id,
            title,
            sort_order,
            free_preview,
            content,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Informational only; previews do not affect section gating.
    #[must_use]
    pub fn free_preview(&self) -> bool {
        self.free_preview
    }

    #[must_use]
    pub fn content(&self) -> &LessonContent {
        &self.content
    }
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// An ordered grouping of lessons plus an optional gating quiz.
///
/// Ordering is defined by `sort_order`, not array position; callers must not
/// assume the server delivers sections pre-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: SectionId,
    title: String,
    sort_order: i32,
    has_quiz: bool,
    lessons: Vec<Lesson>,
}

impl Section {
    /// Create a section snapshot. Lessons are kept in the given order;
    /// sorting happens at traversal time.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptySectionTitle` if the title is blank.
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        sort_order: i32,
        has_quiz: bool,
        lessons: Vec<Lesson>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptySectionTitle);
        }
        Ok(Self {
            id,
            title,
            sort_order,
            has_quiz,
            lessons,
        })
    }

    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    #[must_use]
    pub fn has_quiz(&self) -> bool {
        self.has_quiz
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Lessons sorted by their own `sort_order` (stable on ties).
    #[must_use]
    pub fn lessons_sorted(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self.lessons.iter().collect();
        lessons.sort_by_key(|l| l.sort_order());
        lessons
    }

    #[must_use]
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A full course snapshot: sections with lessons, plus the quizzes that gate
/// section boundaries. Each quiz is tied to exactly one section through its
/// `section_id` foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: String,
    slug: String,
    description: Option<String>,
    sections: Vec<Section>,
    quizzes: Vec<Quiz>,
}

impl Course {
    /// Create a course snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` / `CourseError::EmptySlug` on blank
    /// identity fields, and `CourseError::DuplicateSectionQuiz` if two quizzes
    /// claim the same section.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        slug: impl Into<String>,
        description: Option<String>,
        sections: Vec<Section>,
        quizzes: Vec<Quiz>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(CourseError::EmptySlug);
        }

        for (i, quiz) in quizzes.iter().enumerate() {
            if quizzes[..i].iter().any(|q| q.section_id() == quiz.section_id()) {
                return Err(CourseError::DuplicateSectionQuiz {
                    section_id: quiz.section_id(),
                });
            }
        }

        Ok(Self {
            id,
            title,
            slug,
            description,
            sections,
            quizzes,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    /// Sections sorted by `sort_order` (stable on ties).
    #[must_use]
    pub fn sections_sorted(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.sort_order());
        sections
    }

    /// The zero-or-one quiz whose `section_id` matches the given section.
    #[must_use]
    pub fn quiz_for_section(&self, section_id: SectionId) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.section_id() == section_id)
    }

    #[must_use]
    pub fn quiz(&self, id: QuizId) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id() == id)
    }

    /// The section owning the given lesson, if any.
    #[must_use]
    pub fn section_of_lesson(&self, lesson_id: LessonId) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.lessons().iter().any(|l| l.id() == lesson_id))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
