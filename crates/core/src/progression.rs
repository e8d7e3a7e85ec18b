//! The course progression model: a pure transform from three independently
//! fetched server payloads (course structure, flat progress list, per-quiz
//! attempt history) into one consistent unlock view.
//!
//! The view is rebuilt from fresh inputs after every mutating action; it is
//! never patched in place.

use std::collections::{HashMap, HashSet};

use crate::model::{
    Course, LessonId, ProgressRecord, Quiz, QuizAttempt, QuizId, Section, SectionId,
};

//
// ─── QUIZ STATUS ───────────────────────────────────────────────────────────────
//

/// A section quiz annotated with the learner's attempt history.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizStatus {
    quiz: Quiz,
    is_completed: bool,
    is_passed: bool,
    score: Option<f64>,
}

impl QuizStatus {
    /// Merge attempt history into a quiz summary.
    ///
    /// The reported score prefers the best passed attempt; while the learner
    /// is still failing, the most recent attempt's score is shown instead.
    #[must_use]
    pub fn from_attempts(quiz: Quiz, attempts: &[QuizAttempt]) -> Self {
        let is_completed = !attempts.is_empty();
        let is_passed = attempts.iter().any(|a| a.passed);

        let score = if is_passed {
            attempts
                .iter()
                .filter(|a| a.passed)
                .map(|a| a.score)
                .fold(None, |best: Option<f64>, s| {
                    Some(best.map_or(s, |b| b.max(s)))
                })
        } else {
            attempts
                .iter()
                .max_by_key(|a| a.submitted_at)
                .map(|a| a.score)
        };

        Self {
            quiz,
            is_completed,
            is_passed,
            score,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz.id()
    }

    /// At least one attempt exists, passed or not.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.is_passed
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.score
    }
}

//
// ─── SECTION VIEW ──────────────────────────────────────────────────────────────
//

/// One section decorated with derived unlock and completion state.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    section: Section,
    is_unlocked: bool,
    completed_lessons: usize,
    section_quiz: Option<QuizStatus>,
}

impl SectionView {
    #[must_use]
    pub fn section(&self) -> &Section {
        &self.section
    }

    #[must_use]
    pub fn id(&self) -> SectionId {
        self.section.id()
    }

    /// Whether the learner may access this section's lessons and quiz.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.is_unlocked
    }

    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.completed_lessons
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.section.lessons().len()
    }

    /// True when every lesson in the section is completed. A section with no
    /// lessons counts as complete (vacuously).
    #[must_use]
    pub fn lessons_complete(&self) -> bool {
        self.completed_lessons == self.total_lessons()
    }

    /// The quiz gating this section's exit, annotated with attempt status.
    #[must_use]
    pub fn section_quiz(&self) -> Option<&QuizStatus> {
        self.section_quiz.as_ref()
    }

    fn quiz_satisfied(&self) -> bool {
        self.section_quiz.as_ref().is_none_or(QuizStatus::is_passed)
    }
}

//
// ─── PROGRESSION VIEW ──────────────────────────────────────────────────────────
//

/// The derived, per-session annotation of a course: sections in traversal
/// order, each carrying `is_unlocked` and its quiz status.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionView {
    sections: Vec<SectionView>,
    completed: HashSet<LessonId>,
}

impl ProgressionView {
    /// Sections in `sort_order`, each annotated.
    #[must_use]
    pub fn sections(&self) -> &[SectionView] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn section_of_lesson(&self, lesson_id: LessonId) -> Option<&SectionView> {
        self.sections
            .iter()
            .find(|s| s.section().lesson(lesson_id).is_some())
    }

    #[must_use]
    pub fn is_section_unlocked(&self, id: SectionId) -> bool {
        self.section(id).is_some_and(SectionView::is_unlocked)
    }

    /// A lesson's accessibility equals its owning section's unlock state;
    /// there is no per-lesson lock.
    #[must_use]
    pub fn is_lesson_accessible(&self, lesson_id: LessonId) -> bool {
        self.section_of_lesson(lesson_id)
            .is_some_and(SectionView::is_unlocked)
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: LessonId) -> bool {
        self.completed.contains(&lesson_id)
    }

    #[must_use]
    pub fn quiz_status(&self, quiz_id: QuizId) -> Option<&QuizStatus> {
        self.sections
            .iter()
            .filter_map(SectionView::section_quiz)
            .find(|q| q.quiz_id() == quiz_id)
    }

    #[must_use]
    pub fn section_for_quiz(&self, quiz_id: QuizId) -> Option<&SectionView> {
        self.sections.iter().find(|s| {
            s.section_quiz()
                .is_some_and(|q| q.quiz_id() == quiz_id)
        })
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.sections.iter().map(SectionView::total_lessons).sum()
    }

    #[must_use]
    pub fn completed_lesson_count(&self) -> usize {
        self.sections
            .iter()
            .map(SectionView::completed_lessons)
            .sum()
    }
}

//
// ─── BUILD ─────────────────────────────────────────────────────────────────────
//

/// Derive the unlock view from fresh server snapshots.
///
/// Sections are walked in `sort_order`. The first section is always unlocked;
/// each later section is unlocked iff the previous section is itself unlocked,
/// all of its lessons are completed, and its quiz (when present) has a passed
/// attempt. A locked section therefore keeps everything after it locked, with
/// no explicit propagation step.
///
/// A quiz id missing from `attempts_by_quiz` means "no attempts": callers
/// that failed to fetch attempt history pass an empty list, so a fetch error
/// can only ever keep a section locked, never unlock one.
#[must_use]
pub fn build_progression_view(
    course: &Course,
    progress: &[ProgressRecord],
    attempts_by_quiz: &HashMap<QuizId, Vec<QuizAttempt>>,
) -> ProgressionView {
    // Duplicate records for a lesson are OR-ed together.
    let completed: HashSet<LessonId> = progress
        .iter()
        .filter(|r| r.is_completed)
        .map(|r| r.lesson_id)
        .collect();

    let mut sections = Vec::with_capacity(course.sections().len());
    let mut chain_open = true;

    for (index, section) in course.sections_sorted().into_iter().enumerate() {
        let is_unlocked = index == 0 || chain_open;

        let completed_lessons = section
            .lessons()
            .iter()
            .filter(|l| completed.contains(&l.id()))
            .count();

        let section_quiz = course.quiz_for_section(section.id()).map(|quiz| {
            let attempts = attempts_by_quiz
                .get(&quiz.id())
                .map_or(&[][..], Vec::as_slice);
            QuizStatus::from_attempts(quiz.clone(), attempts)
        });

        let view = SectionView {
            section: section.clone(),
            is_unlocked,
            completed_lessons,
            section_quiz,
        };

        chain_open = is_unlocked && view.lessons_complete() && view.quiz_satisfied();
        sections.push(view);
    }

    ProgressionView {
        sections,
        completed,
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AttemptId, Course, CourseId, Lesson, LessonContent, Quiz, Section,
    };
    use crate::time::fixed_now;
    use chrono::Duration;
    use uuid::Uuid;

    fn lesson(n: u128, order: i32) -> Lesson {
        Lesson::new(
            LessonId::new(Uuid::from_u128(n)),
            format!("Lesson {n}"),
            order,
            false,
            LessonContent::Text { body: "b".into() },
        )
        .unwrap()
    }

    fn section(n: u128, order: i32, has_quiz: bool, lessons: Vec<Lesson>) -> Section {
        Section::new(
            SectionId::new(Uuid::from_u128(n)),
            format!("Section {n}"),
            order,
            has_quiz,
            lessons,
        )
        .unwrap()
    }

    fn quiz(n: u128, section: u128) -> Quiz {
        Quiz::new(
            QuizId::new(Uuid::from_u128(n)),
            SectionId::new(Uuid::from_u128(section)),
            10,
            70,
            3,
        )
        .unwrap()
    }

    fn attempt(n: u128, passed: bool, score: f64, minutes_ago: i64) -> QuizAttempt {
        QuizAttempt {
            id: AttemptId::new(Uuid::from_u128(n)),
            passed,
            score,
            submitted_at: fixed_now() - Duration::minutes(minutes_ago),
        }
    }

    fn done(n: u128) -> ProgressRecord {
        ProgressRecord::completed(LessonId::new(Uuid::from_u128(n)), fixed_now())
    }

    /// Three sections; section 1's quiz is unattempted.
    fn gated_course() -> Course {
        Course::new(
            CourseId::new(Uuid::from_u128(1)),
            "Rust 101",
            "rust-101",
            None,
            vec![
                section(1, 1, true, vec![lesson(11, 1), lesson(12, 2)]),
                section(2, 2, false, vec![lesson(21, 1)]),
                section(3, 3, false, vec![lesson(31, 1)]),
            ],
            vec![quiz(100, 1)],
        )
        .unwrap()
    }

    #[test]
    fn first_section_unlocked_with_zero_progress() {
        let course = gated_course();
        let view = build_progression_view(&course, &[], &HashMap::new());

        assert!(view.sections()[0].is_unlocked());
        assert!(!view.sections()[1].is_unlocked());
        assert!(!view.sections()[2].is_unlocked());
    }

    #[test]
    fn unpassed_quiz_locks_entire_downstream_chain() {
        let course = gated_course();
        // Every lesson in the course is completed, but the section 1 quiz
        // was failed.
        let progress = vec![done(11), done(12), done(21), done(31)];
        let attempts = HashMap::from([(
            QuizId::new(Uuid::from_u128(100)),
            vec![attempt(1, false, 40.0, 5)],
        )]);

        let view = build_progression_view(&course, &progress, &attempts);

        assert!(view.sections()[0].is_unlocked());
        assert!(!view.sections()[1].is_unlocked());
        assert!(!view.sections()[2].is_unlocked());
    }

    #[test]
    fn passed_quiz_and_complete_lessons_unlock_next() {
        let course = gated_course();
        let progress = vec![done(11), done(12)];
        let attempts = HashMap::from([(
            QuizId::new(Uuid::from_u128(100)),
            vec![attempt(1, false, 40.0, 10), attempt(2, true, 85.0, 5)],
        )]);

        let view = build_progression_view(&course, &progress, &attempts);

        assert!(view.sections()[1].is_unlocked());
        // Section 2's own lesson is untouched, so section 3 stays locked.
        assert!(!view.sections()[2].is_unlocked());
    }

    #[test]
    fn missing_attempt_entry_is_fail_locked() {
        let course = gated_course();
        let progress = vec![done(11), done(12)];
        // Attempt fetch failed upstream; the quiz id is simply absent.
        let view = build_progression_view(&course, &progress, &HashMap::new());

        assert!(!view.sections()[1].is_unlocked());
        let status = view.sections()[0].section_quiz().unwrap();
        assert!(!status.is_passed());
        assert_eq!(status.score(), None);
    }

    #[test]
    fn section_without_quiz_unlocks_on_lessons_alone() {
        let course = Course::new(
            CourseId::new(Uuid::from_u128(1)),
            "Rust 101",
            "rust-101",
            None,
            vec![
                section(1, 1, false, vec![lesson(11, 1)]),
                section(2, 2, false, vec![lesson(21, 1)]),
            ],
            Vec::new(),
        )
        .unwrap();

        let view = build_progression_view(&course, &[done(11)], &HashMap::new());
        assert!(view.sections()[1].is_unlocked());
    }

    #[test]
    fn duplicate_progress_records_are_or_ed() {
        let course = gated_course();
        let mut progress = vec![done(11), done(11)];
        progress.push(ProgressRecord {
            lesson_id: LessonId::new(Uuid::from_u128(11)),
            is_completed: false,
            completed_at: None,
            watch_time_secs: 30,
            last_position_secs: 30,
        });

        let view = build_progression_view(&course, &progress, &HashMap::new());
        assert!(view.is_lesson_completed(LessonId::new(Uuid::from_u128(11))));
        assert_eq!(view.sections()[0].completed_lessons(), 1);
    }

    #[test]
    fn score_prefers_best_passed_attempt() {
        let q = quiz(100, 1);
        let status = QuizStatus::from_attempts(
            q.clone(),
            &[
                attempt(1, true, 75.0, 30),
                attempt(2, false, 90.0, 20),
                attempt(3, true, 80.0, 10),
            ],
        );
        assert!(status.is_passed());
        assert_eq!(status.score(), Some(80.0));

        let failing = QuizStatus::from_attempts(
            q,
            &[attempt(1, false, 20.0, 30), attempt(2, false, 55.0, 10)],
        );
        assert!(!failing.is_passed());
        assert_eq!(failing.score(), Some(55.0));
    }

    #[test]
    fn rebuild_with_identical_inputs_is_identical() {
        let course = gated_course();
        let progress = vec![done(11), done(12), done(21)];
        let attempts = HashMap::from([(
            QuizId::new(Uuid::from_u128(100)),
            vec![attempt(1, true, 90.0, 5)],
        )]);

        let a = build_progression_view(&course, &progress, &attempts);
        let b = build_progression_view(&course, &progress, &attempts);
        assert_eq!(a, b);
    }

    #[test]
    fn unordered_section_input_is_traversed_by_sort_order() {
        let course = Course::new(
            CourseId::new(Uuid::from_u128(1)),
            "Rust 101",
            "rust-101",
            None,
            // Arrives out of order.
            vec![
                section(2, 2, false, vec![lesson(21, 1)]),
                section(1, 1, false, vec![lesson(11, 1)]),
            ],
            Vec::new(),
        )
        .unwrap();

        let view = build_progression_view(&course, &[], &HashMap::new());
        assert_eq!(view.sections()[0].section().title(), "Section 1");
        assert!(view.sections()[0].is_unlocked());
        assert!(!view.sections()[1].is_unlocked());
    }
}
