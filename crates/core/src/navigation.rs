//! Linear previous/next navigation over the flattened lesson sequence.
//!
//! The sequence is the concatenation of sections in `sort_order`, each
//! exploded into its lessons in their own `sort_order`. It is recomputed from
//! the current progression view on every use, never cached across mutations.

use crate::model::{LessonId, QuizId, SectionId};
use crate::progression::ProgressionView;

/// One position in the flattened lesson sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRef {
    pub lesson_id: LessonId,
    pub section_id: SectionId,
    pub title: String,
}

/// What acting on "next" from the current position means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// A next lesson exists and the section boundary (if any) is open.
    AdvanceTo(LessonRef),
    /// The current section's exit quiz has not been passed; navigation must
    /// not cross into the next section, the quiz is offered instead.
    StartQuiz(QuizId),
    /// Last lesson of the course with no outstanding quiz.
    CourseComplete,
}

/// Flatten a progression view into the deterministic lesson sequence.
#[must_use]
pub fn flatten_lessons(view: &ProgressionView) -> Vec<LessonRef> {
    let mut sequence = Vec::with_capacity(view.total_lessons());
    for section_view in view.sections() {
        let section = section_view.section();
        for lesson in section.lessons_sorted() {
            sequence.push(LessonRef {
                lesson_id: lesson.id(),
                section_id: section.id(),
                title: lesson.title().to_owned(),
            });
        }
    }
    sequence
}

/// The previous/next pointer over the flattened sequence.
///
/// `current = None` is the course-overview position, conceptually index -1:
/// "next" enters the first lesson and there is nothing before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCursor {
    sequence: Vec<LessonRef>,
    position: Option<usize>,
}

impl NavigationCursor {
    /// Build a cursor for the given view and current lesson. A lesson id that
    /// no longer exists in the sequence degrades to the overview position.
    #[must_use]
    pub fn locate(view: &ProgressionView, current: Option<LessonId>) -> Self {
        let sequence = flatten_lessons(view);
        let position =
            current.and_then(|id| sequence.iter().position(|l| l.lesson_id == id));
        Self { sequence, position }
    }

    #[must_use]
    pub fn sequence(&self) -> &[LessonRef] {
        &self.sequence
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.sequence.len()
    }

    /// 1-based index of the current lesson; `None` at the overview.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.position.map(|i| i + 1)
    }

    #[must_use]
    pub fn current(&self) -> Option<&LessonRef> {
        self.position.and_then(|i| self.sequence.get(i))
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        matches!(self.position, Some(i) if i > 0)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_lesson().is_some()
    }

    /// The lesson before the current one. Pure back-navigation: no completion
    /// side effects and no quiz checks apply to it.
    #[must_use]
    pub fn previous_lesson(&self) -> Option<&LessonRef> {
        match self.position {
            Some(i) if i > 0 => self.sequence.get(i - 1),
            _ => None,
        }
    }

    /// The next lesson in sequence, ignoring gating. Gating is the business
    /// of [`NavigationCursor::next_step`].
    #[must_use]
    pub fn next_lesson(&self) -> Option<&LessonRef> {
        match self.position {
            Some(i) => self.sequence.get(i + 1),
            None => self.sequence.first(),
        }
    }

    /// Resolve what "next" means here, against the current unlock state.
    ///
    /// At the last lesson of a section whose quiz is unpassed, the step is
    /// `StartQuiz`, never a cross-section advance. With the quiz passed (or
    /// absent) the step advances, or reports course completion when nothing
    /// follows.
    #[must_use]
    pub fn next_step(&self, view: &ProgressionView) -> NextStep {
        let Some(position) = self.position else {
            // Overview: enter the course at its first lesson.
            return match self.sequence.first() {
                Some(first) => NextStep::AdvanceTo(first.clone()),
                None => NextStep::CourseComplete,
            };
        };

        let current = &self.sequence[position];
        let next = self.sequence.get(position + 1);
        let leaving_section =
            next.is_none_or(|n| n.section_id != current.section_id);

        if leaving_section {
            let unpassed_quiz = view
                .section(current.section_id)
                .and_then(|s| s.section_quiz())
                .filter(|q| !q.is_passed());
            if let Some(status) = unpassed_quiz {
                return NextStep::StartQuiz(status.quiz_id());
            }
        }

        match next {
            Some(lesson) => NextStep::AdvanceTo(lesson.clone()),
            None => NextStep::CourseComplete,
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AttemptId, Course, CourseId, Lesson, LessonContent, ProgressRecord, Quiz, QuizAttempt,
        Section,
    };
    use crate::progression::build_progression_view;
    use crate::time::fixed_now;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn lid(n: u128) -> LessonId {
        LessonId::new(Uuid::from_u128(n))
    }

    fn lesson(n: u128, order: i32) -> Lesson {
        Lesson::new(
            lid(n),
            format!("L{n}"),
            order,
            false,
            LessonContent::Text { body: "b".into() },
        )
        .unwrap()
    }

    fn section(n: u128, order: i32, has_quiz: bool, lessons: Vec<Lesson>) -> Section {
        Section::new(
            SectionId::new(Uuid::from_u128(n)),
            format!("S{n}"),
            order,
            has_quiz,
            lessons,
        )
        .unwrap()
    }

    /// Sections arrive out of array order: [sort 2: L3], [sort 1: L1, L2].
    fn shuffled_course(with_quiz: bool) -> Course {
        let quizzes = if with_quiz {
            vec![
                Quiz::new(
                    QuizId::new(Uuid::from_u128(100)),
                    SectionId::new(Uuid::from_u128(1)),
                    0,
                    70,
                    3,
                )
                .unwrap(),
            ]
        } else {
            Vec::new()
        };
        Course::new(
            CourseId::new(Uuid::from_u128(1)),
            "Rust 101",
            "rust-101",
            None,
            vec![
                section(2, 2, false, vec![lesson(3, 1)]),
                section(1, 1, with_quiz, vec![lesson(2, 2), lesson(1, 1)]),
            ],
            quizzes,
        )
        .unwrap()
    }

    fn view_of(course: &Course, progress: &[ProgressRecord]) -> ProgressionView {
        build_progression_view(course, progress, &HashMap::new())
    }

    #[test]
    fn flattened_sequence_follows_sort_order_not_array_order() {
        let course = shuffled_course(false);
        let view = view_of(&course, &[]);
        let sequence = flatten_lessons(&view);

        let ids: Vec<LessonId> = sequence.iter().map(|l| l.lesson_id).collect();
        assert_eq!(ids, vec![lid(1), lid(2), lid(3)]);
    }

    #[test]
    fn overview_position_has_no_previous_and_enters_first_lesson() {
        let course = shuffled_course(false);
        let view = view_of(&course, &[]);
        let cursor = NavigationCursor::locate(&view, None);

        assert!(!cursor.has_previous());
        assert!(cursor.has_next());
        assert_eq!(cursor.current_index(), None);
        assert_eq!(
            cursor.next_step(&view),
            NextStep::AdvanceTo(cursor.sequence()[0].clone())
        );
    }

    #[test]
    fn mid_section_next_advances() {
        let course = shuffled_course(false);
        let view = view_of(&course, &[]);
        let cursor = NavigationCursor::locate(&view, Some(lid(1)));

        assert_eq!(cursor.current_index(), Some(1));
        assert_eq!(cursor.total_lessons(), 3);
        match cursor.next_step(&view) {
            NextStep::AdvanceTo(lesson) => assert_eq!(lesson.lesson_id, lid(2)),
            other => panic!("expected advance, got {other:?}"),
        }
    }

    #[test]
    fn unpassed_quiz_blocks_cross_section_next() {
        let course = shuffled_course(true);
        let progress = vec![
            ProgressRecord::completed(lid(1), fixed_now()),
            ProgressRecord::completed(lid(2), fixed_now()),
        ];
        let view = view_of(&course, &progress);
        let cursor = NavigationCursor::locate(&view, Some(lid(2)));

        assert_eq!(
            cursor.next_step(&view),
            NextStep::StartQuiz(QuizId::new(Uuid::from_u128(100)))
        );
    }

    #[test]
    fn passed_quiz_opens_cross_section_next() {
        let course = shuffled_course(true);
        let progress = vec![
            ProgressRecord::completed(lid(1), fixed_now()),
            ProgressRecord::completed(lid(2), fixed_now()),
        ];
        let attempts = HashMap::from([(
            QuizId::new(Uuid::from_u128(100)),
            vec![QuizAttempt {
                id: AttemptId::new(Uuid::from_u128(500)),
                passed: true,
                score: 90.0,
                submitted_at: fixed_now(),
            }],
        )]);
        let view = build_progression_view(&course, &progress, &attempts);
        let cursor = NavigationCursor::locate(&view, Some(lid(2)));

        match cursor.next_step(&view) {
            NextStep::AdvanceTo(lesson) => assert_eq!(lesson.lesson_id, lid(3)),
            other => panic!("expected advance, got {other:?}"),
        }
    }

    #[test]
    fn last_lesson_without_quiz_completes_course() {
        let course = shuffled_course(false);
        let view = view_of(&course, &[]);
        let cursor = NavigationCursor::locate(&view, Some(lid(3)));

        assert!(!cursor.has_next());
        assert_eq!(cursor.next_step(&view), NextStep::CourseComplete);
    }

    #[test]
    fn previous_is_pure_back_navigation() {
        let course = shuffled_course(true);
        let view = view_of(&course, &[]);

        let cursor = NavigationCursor::locate(&view, Some(lid(3)));
        // Crossing a section boundary backwards needs no quiz check.
        assert_eq!(cursor.previous_lesson().unwrap().lesson_id, lid(2));

        let at_first = NavigationCursor::locate(&view, Some(lid(1)));
        assert!(!at_first.has_previous());
        assert_eq!(at_first.previous_lesson(), None);
    }

    #[test]
    fn stale_lesson_id_degrades_to_overview() {
        let course = shuffled_course(false);
        let view = view_of(&course, &[]);
        let cursor = NavigationCursor::locate(&view, Some(lid(999)));

        assert_eq!(cursor.current_index(), None);
        assert!(!cursor.has_previous());
    }
}
