use course_core::model::{AttemptId, Course, LessonId, QuizId, QuizResult};
use course_core::{NavigationCursor, ProgressionView, QuizSession};

use super::progress::CourseProgressSummary;

/// Where the learner currently is in the quiz flow.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    /// Browsing lessons; no attempt active.
    Lesson,
    /// An attempt is in flight.
    Taking(QuizSession),
    /// The last attempt has been graded and its result is on screen.
    Results {
        quiz_id: QuizId,
        attempt_id: AttemptId,
        result: QuizResult,
    },
}

/// Mutable per-course learning state operated on by `LearningFlowService`.
///
/// Holds the last server-confirmed snapshot (course + derived view), the
/// current lesson position, and the quiz phase. The view is only ever
/// replaced wholesale after a successful refetch, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningSession {
    course: Course,
    view: ProgressionView,
    current_lesson: Option<LessonId>,
    phase: QuizPhase,
}

impl LearningSession {
    pub(crate) fn new(course: Course, view: ProgressionView) -> Self {
        Self {
            course,
            view,
            current_lesson: None,
            phase: QuizPhase::Lesson,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn view(&self) -> &ProgressionView {
        &self.view
    }

    /// `None` means the course-overview position.
    #[must_use]
    pub fn current_lesson(&self) -> Option<LessonId> {
        self.current_lesson
    }

    #[must_use]
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_taking_quiz(&self) -> bool {
        matches!(self.phase, QuizPhase::Taking(_))
    }

    #[must_use]
    pub fn taking(&self) -> Option<&QuizSession> {
        match &self.phase {
            QuizPhase::Taking(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            QuizPhase::Results { result, .. } => Some(result),
            _ => None,
        }
    }

    /// A fresh cursor over the current view; recomputed on every call so it
    /// can never go stale against the unlock state.
    #[must_use]
    pub fn cursor(&self) -> NavigationCursor {
        NavigationCursor::locate(&self.view, self.current_lesson)
    }

    #[must_use]
    pub fn progress(&self) -> CourseProgressSummary {
        CourseProgressSummary::from_view(&self.view)
    }

    pub(crate) fn replace_snapshot(&mut self, course: Course, view: ProgressionView) {
        self.course = course;
        self.view = view;
    }

    pub(crate) fn set_current_lesson(&mut self, lesson: Option<LessonId>) {
        self.current_lesson = lesson;
    }

    pub(crate) fn set_phase(&mut self, phase: QuizPhase) {
        self.phase = phase;
    }

    pub(crate) fn taking_mut(&mut self) -> Option<&mut QuizSession> {
        match &mut self.phase {
            QuizPhase::Taking(session) => Some(session),
            _ => None,
        }
    }
}
