#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use course_client::InMemoryCourseApi;
use course_core::model::{
    AnswerId, AttemptId, Course, CourseId, LearnerContext, LearnerId, Lesson, LessonContent,
    LessonId, ProgressRecord, QuestionId, QuestionKind, Quiz, QuizAnswer, QuizAttempt,
    QuizQuestion, QuizId, Section, SectionId,
};
use course_core::time::fixed_now;
use course_core::Clock;
use services::LearningFlowService;

pub fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn lid(n: u128) -> LessonId {
    LessonId::new(uid(n))
}

pub fn sid(n: u128) -> SectionId {
    SectionId::new(uid(n))
}

pub fn qid(n: u128) -> QuizId {
    QuizId::new(uid(n))
}

pub fn aid(n: u128) -> AnswerId {
    AnswerId::new(uid(n))
}

pub fn lesson(n: u128, order: i32) -> Lesson {
    Lesson::new(
        lid(n),
        format!("Lesson {n}"),
        order,
        false,
        LessonContent::Text {
            body: format!("lesson {n} body"),
        },
    )
    .unwrap()
}

/// Question `n` with two options: answer `n * 10` is correct, `n * 10 + 1`
/// is not.
pub fn question(n: u128) -> QuizQuestion {
    QuizQuestion::new(
        QuestionId::new(uid(n)),
        format!("Question {n}"),
        QuestionKind::MultipleChoice,
        1,
        vec![
            QuizAnswer {
                id: aid(n * 10),
                text: "right".into(),
                is_correct: true,
            },
            QuizAnswer {
                id: aid(n * 10 + 1),
                text: "wrong".into(),
                is_correct: false,
            },
        ],
    )
    .unwrap()
}

pub fn correct_answer(question_n: u128) -> AnswerId {
    aid(question_n * 10)
}

pub fn wrong_answer(question_n: u128) -> AnswerId {
    aid(question_n * 10 + 1)
}

pub const QUIZ_1: u128 = 900;

/// Three sections in sort order. Section 1 ([L1, L2]) carries the one-minute
/// quiz `QUIZ_1`; sections 2 ([L3]) and 3 ([L4]) are quiz-free.
pub fn sample_course() -> Course {
    Course::new(
        CourseId::new(uid(1)),
        "Rust for Learners",
        "rust-for-learners",
        Some("An example course".into()),
        vec![
            Section::new(sid(3), "Wrap-up", 3, false, vec![lesson(4, 1)]).unwrap(),
            Section::new(sid(1), "Basics", 1, true, vec![lesson(2, 2), lesson(1, 1)]).unwrap(),
            Section::new(sid(2), "Ownership", 2, false, vec![lesson(3, 1)]).unwrap(),
        ],
        vec![Quiz::new(qid(QUIZ_1), sid(1), 1, 70, 3).unwrap()],
    )
    .unwrap()
}

/// Like `sample_course` but the quiz gates section 2 instead of section 1.
pub fn course_with_quiz_on_section2() -> Course {
    Course::new(
        CourseId::new(uid(1)),
        "Rust for Learners",
        "rust-for-learners",
        None,
        vec![
            Section::new(sid(1), "Basics", 1, false, vec![lesson(1, 1)]).unwrap(),
            Section::new(sid(2), "Ownership", 2, true, vec![lesson(3, 1)]).unwrap(),
            Section::new(sid(3), "Wrap-up", 3, false, vec![lesson(4, 1)]).unwrap(),
        ],
        vec![Quiz::new(qid(QUIZ_1), sid(2), 1, 70, 3).unwrap()],
    )
    .unwrap()
}

/// Two quiz-free sections: section 1 holds [L1, L2], section 2 holds [L3].
/// Section 2 unlocks on lesson completion alone.
pub fn quiz_free_course() -> Course {
    Course::new(
        CourseId::new(uid(1)),
        "Rust for Learners",
        "rust-for-learners",
        None,
        vec![
            Section::new(sid(1), "Basics", 1, false, vec![lesson(1, 1), lesson(2, 2)]).unwrap(),
            Section::new(sid(2), "Ownership", 2, false, vec![lesson(3, 1)]).unwrap(),
        ],
        Vec::new(),
    )
    .unwrap()
}

pub fn completed(n: u128) -> ProgressRecord {
    ProgressRecord::completed(lid(n), fixed_now())
}

pub fn passed_attempt(n: u128, score: f64) -> QuizAttempt {
    QuizAttempt {
        id: AttemptId::new(uid(n)),
        passed: true,
        score,
        submitted_at: fixed_now(),
    }
}

pub fn failed_attempt(n: u128, score: f64) -> QuizAttempt {
    QuizAttempt {
        id: AttemptId::new(uid(n)),
        passed: false,
        score,
        submitted_at: fixed_now(),
    }
}

pub fn learner() -> LearnerContext {
    LearnerContext::new(LearnerId::new(uid(7)), "Test Learner")
}

/// In-memory server plus a flow service, both on the fixed test clock.
pub fn setup(course: Course) -> (Arc<InMemoryCourseApi>, LearningFlowService) {
    let api = Arc::new(InMemoryCourseApi::new(Clock::fixed(fixed_now())));
    api.seed_course(course);
    let service = LearningFlowService::new(api.clone(), Clock::fixed(fixed_now()), learner());
    (api, service)
}

/// A second stateless service over the same server, observing a later wall
/// clock. Used to simulate time passing for countdown tests.
pub fn service_at(api: Arc<InMemoryCourseApi>, now: DateTime<Utc>) -> LearningFlowService {
    LearningFlowService::new(api, Clock::fixed(now), learner())
}
