use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use course_client::{CourseApi, ProgressUpdate};
use course_core::model::{
    Course, LearnerContext, LessonId, ProgressRecord, QuizAttempt, QuizId,
};
use course_core::{Clock, LessonRef, NextStep, build_progression_view};

use crate::error::{FlowError, Rejection};
use super::session::LearningSession;

/// Outcome of acting on "next" from the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// Navigated to the next lesson.
    Moved(LessonRef),
    /// The section boundary is gated; a quiz attempt was started instead.
    QuizStarted(QuizId),
    /// Nothing follows; the course is done.
    CourseCompleted,
}

/// Orchestrates the learning flow for one course: hydration, lesson
/// completion, next/previous navigation, and (in `quiz_flow`) the quiz
/// lifecycle.
///
/// The service itself is stateless; all per-course state lives in the
/// `LearningSession` value it operates on. Every mutating action goes to the
/// server first and is followed by a full refetch-and-recompute, so the local
/// view never drifts from the system of record.
#[derive(Clone)]
pub struct LearningFlowService {
    api: Arc<dyn CourseApi>,
    clock: Clock,
    learner: LearnerContext,
}

impl LearningFlowService {
    #[must_use]
    pub fn new(api: Arc<dyn CourseApi>, clock: Clock, learner: LearnerContext) -> Self {
        Self {
            api,
            clock,
            learner,
        }
    }

    #[must_use]
    pub fn learner(&self) -> &LearnerContext {
        &self.learner
    }

    pub(crate) fn api(&self) -> &dyn CourseApi {
        self.api.as_ref()
    }

    pub(crate) fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the course and hydrate a fresh learning session.
    ///
    /// The course fetch itself is fatal when it fails. Progress and attempt
    /// fetches degrade instead: missing progress reads as "nothing completed"
    /// and missing attempt history as "no passing attempt", both of which can
    /// only keep sections locked.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` if the course cannot be fetched at all.
    pub async fn load_course(&self, slug: &str) -> Result<LearningSession, FlowError> {
        let course = self.api.fetch_course_by_slug(slug).await?;
        let (progress, attempts) = self.fetch_course_state(&course).await;
        let view = build_progression_view(&course, &progress, &attempts);
        debug!(slug, sections = view.sections().len(), "course hydrated");
        Ok(LearningSession::new(course, view))
    }

    /// Refetch everything and swap the session's snapshot.
    ///
    /// On failure the session keeps its last-known-good snapshot untouched,
    /// so the triggering action can simply be retried.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` if the course refetch fails.
    pub async fn refresh(&self, session: &mut LearningSession) -> Result<(), FlowError> {
        let course = self
            .api
            .fetch_course_by_slug(session.course().slug())
            .await?;
        let (progress, attempts) = self.fetch_course_state(&course).await;
        let view = build_progression_view(&course, &progress, &attempts);
        session.replace_snapshot(course, view);
        Ok(())
    }

    async fn fetch_course_state(
        &self,
        course: &Course,
    ) -> (Vec<ProgressRecord>, HashMap<QuizId, Vec<QuizAttempt>>) {
        let progress = match self.api.fetch_course_progress(course.id()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(%err, "progress fetch failed; treating as no progress");
                Vec::new()
            }
        };

        let mut attempts = HashMap::new();
        for quiz in course.quizzes() {
            let history = match self.api.fetch_quiz_attempts(quiz.id()).await {
                Ok(history) => history,
                Err(err) => {
                    // Fail-locked: a fetch error never unlocks a section.
                    warn!(quiz_id = %quiz.id(), %err, "attempt fetch failed; treating as no attempts");
                    Vec::new()
                }
            };
            attempts.insert(quiz.id(), history);
        }

        (progress, attempts)
    }

    /// Open a lesson in the player.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SectionLocked` if the owning section is locked,
    /// `FlowError::UnknownLesson` for a lesson outside this course.
    pub fn select_lesson(
        &self,
        session: &mut LearningSession,
        lesson_id: LessonId,
    ) -> Result<(), FlowError> {
        if session.course().section_of_lesson(lesson_id).is_none() {
            return Err(FlowError::UnknownLesson);
        }
        if !session.view().is_lesson_accessible(lesson_id) {
            return Err(Rejection::SectionLocked.into());
        }
        session.set_current_lesson(Some(lesson_id));
        Ok(())
    }

    /// Return to the course-overview position.
    pub fn open_overview(&self, session: &mut LearningSession) {
        session.set_current_lesson(None);
    }

    /// Persist a completion for the lesson, then rebuild the view from fresh
    /// server state.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` on a failed update or refetch; the session is
    /// left at its previous snapshot either way.
    pub async fn mark_lesson_complete(
        &self,
        session: &mut LearningSession,
        lesson_id: LessonId,
    ) -> Result<(), FlowError> {
        self.api
            .update_lesson_progress(ProgressUpdate::completed(lesson_id))
            .await?;
        self.refresh(session).await
    }

    /// Record playback telemetry without completing the lesson.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` on a failed update.
    pub async fn record_watch_position(
        &self,
        session: &mut LearningSession,
        lesson_id: LessonId,
        watch_time_secs: u32,
        last_position_secs: u32,
    ) -> Result<(), FlowError> {
        let update = ProgressUpdate {
            lesson_id,
            is_completed: session.view().is_lesson_completed(lesson_id),
            watch_time_secs: Some(watch_time_secs),
            last_position_secs: Some(last_position_secs),
        };
        self.api.update_lesson_progress(update).await?;
        Ok(())
    }

    /// Act on "next": advance, start the gating quiz, or complete the course.
    ///
    /// Advancing marks the current lesson complete first (server round-trip
    /// plus full recompute), so a mid-course reload lands in the same place.
    /// The target is then re-checked against the fresh view: a quiz-free
    /// section boundary stays shut while earlier lessons in the section are
    /// incomplete, the same gate `select_lesson` applies.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SectionLocked` when the next lesson's section is
    /// still locked, quiz-start rejections, or `FlowError::Api` on transport
    /// failures; on any error the position is unchanged.
    pub async fn go_next(
        &self,
        session: &mut LearningSession,
    ) -> Result<NextOutcome, FlowError> {
        let step = session.cursor().next_step(session.view());
        match step {
            NextStep::AdvanceTo(target) => {
                self.complete_current(session).await?;
                if !session.view().is_lesson_accessible(target.lesson_id) {
                    return Err(Rejection::SectionLocked.into());
                }
                session.set_current_lesson(Some(target.lesson_id));
                Ok(NextOutcome::Moved(target))
            }
            NextStep::StartQuiz(quiz_id) => {
                self.complete_current(session).await?;
                self.start_quiz(session, quiz_id).await?;
                Ok(NextOutcome::QuizStarted(quiz_id))
            }
            NextStep::CourseComplete => {
                self.complete_current(session).await?;
                Ok(NextOutcome::CourseCompleted)
            }
        }
    }

    /// Pure back-navigation: no completion side effects, no quiz checks.
    /// Stepping back from the first lesson returns to the overview.
    pub fn go_previous(&self, session: &mut LearningSession) -> Option<LessonRef> {
        let previous = session.cursor().previous_lesson().cloned();
        match &previous {
            Some(lesson) => session.set_current_lesson(Some(lesson.lesson_id)),
            None => session.set_current_lesson(None),
        }
        previous
    }

    async fn complete_current(&self, session: &mut LearningSession) -> Result<(), FlowError> {
        let Some(current) = session.current_lesson() else {
            return Ok(());
        };
        if session.view().is_lesson_completed(current) {
            return Ok(());
        }
        self.mark_lesson_complete(session, current).await
    }
}
