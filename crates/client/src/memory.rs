//! In-memory `CourseApi` double for services and integration tests.
//!
//! It plays the trusted server: attempts are minted here, answers are
//! persisted here, and grading runs against the seeded answer key. Individual
//! operations can be made to fail to exercise transient-network paths.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use course_core::Clock;
use course_core::model::{
    AnswerId, AttemptId, Course, CourseId, ProgressRecord, QuestionId, QuestionReview,
    QuizAttempt, QuizId, QuizQuestion, QuizResult,
};

use crate::api::{CourseApi, ProgressUpdate, StartedAttempt};
use crate::error::ApiError;

#[derive(Debug, Clone)]
struct OpenAttempt {
    quiz_id: QuizId,
    answers: HashMap<QuestionId, AnswerId>,
}

#[derive(Debug, Default)]
struct Failures {
    fetch_course: bool,
    fetch_progress: bool,
    start_quiz: bool,
    submit_answer: bool,
    submit_quiz: bool,
    update_progress: bool,
    fetch_attempts_for: HashSet<QuizId>,
}

#[derive(Debug, Default)]
struct State {
    course: Option<Course>,
    progress: Vec<ProgressRecord>,
    attempts: HashMap<QuizId, Vec<QuizAttempt>>,
    question_bank: HashMap<QuizId, Vec<QuizQuestion>>,
    open_attempts: HashMap<AttemptId, OpenAttempt>,
    reviews: HashMap<AttemptId, Vec<QuestionReview>>,
    failures: Failures,
}

/// Scripted in-memory server.
pub struct InMemoryCourseApi {
    clock: Clock,
    state: Mutex<State>,
}

fn unavailable() -> ApiError {
    ApiError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE)
}

impl InMemoryCourseApi {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("in-memory api lock poisoned")
    }

    pub fn seed_course(&self, course: Course) {
        self.lock().course = Some(course);
    }

    pub fn seed_progress(&self, records: Vec<ProgressRecord>) {
        self.lock().progress = records;
    }

    pub fn seed_attempts(&self, quiz_id: QuizId, attempts: Vec<QuizAttempt>) {
        self.lock().attempts.insert(quiz_id, attempts);
    }

    /// Question set (with answer key) the server reveals when the quiz is
    /// started.
    pub fn seed_questions(&self, quiz_id: QuizId, questions: Vec<QuizQuestion>) {
        self.lock().question_bank.insert(quiz_id, questions);
    }

    pub fn fail_fetch_course(&self, fail: bool) {
        self.lock().failures.fetch_course = fail;
    }

    pub fn fail_fetch_progress(&self, fail: bool) {
        self.lock().failures.fetch_progress = fail;
    }

    pub fn fail_start_quiz(&self, fail: bool) {
        self.lock().failures.start_quiz = fail;
    }

    pub fn fail_submit_answer(&self, fail: bool) {
        self.lock().failures.submit_answer = fail;
    }

    pub fn fail_submit_quiz(&self, fail: bool) {
        self.lock().failures.submit_quiz = fail;
    }

    pub fn fail_update_progress(&self, fail: bool) {
        self.lock().failures.update_progress = fail;
    }

    pub fn fail_fetch_attempts(&self, quiz_id: QuizId, fail: bool) {
        let mut state = self.lock();
        if fail {
            state.failures.fetch_attempts_for.insert(quiz_id);
        } else {
            state.failures.fetch_attempts_for.remove(&quiz_id);
        }
    }

    /// Answers the server has persisted for an open attempt.
    #[must_use]
    pub fn recorded_answers(&self, attempt_id: AttemptId) -> HashMap<QuestionId, AnswerId> {
        self.lock()
            .open_attempts
            .get(&attempt_id)
            .map(|a| a.answers.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn attempt_count(&self, quiz_id: QuizId) -> usize {
        self.lock()
            .attempts
            .get(&quiz_id)
            .map_or(0, Vec::len)
    }

    fn grade(questions: &[QuizQuestion], answers: &HashMap<QuestionId, AnswerId>) -> (u32, f64) {
        let total_points: u32 = questions.iter().map(QuizQuestion::points).sum();
        let mut earned_points = 0_u32;
        let mut correct = 0_u32;
        for question in questions {
            let selected = answers.get(&question.id());
            let correct_answer = question.answers().iter().find(|a| a.is_correct);
            if let (Some(selected), Some(expected)) = (selected, correct_answer) {
                if *selected == expected.id {
                    correct += 1;
                    earned_points += question.points();
                }
            }
        }
        let score = if total_points == 0 {
            0.0
        } else {
            f64::from(earned_points) / f64::from(total_points) * 100.0
        };
        (correct, score)
    }
}

#[async_trait]
impl CourseApi for InMemoryCourseApi {
    async fn fetch_course_by_slug(&self, slug: &str) -> Result<Course, ApiError> {
        let state = self.lock();
        if state.failures.fetch_course {
            return Err(unavailable());
        }
        state
            .course
            .as_ref()
            .filter(|c| c.slug() == slug)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn fetch_course_progress(
        &self,
        _course_id: CourseId,
    ) -> Result<Vec<ProgressRecord>, ApiError> {
        let state = self.lock();
        if state.failures.fetch_progress {
            return Err(unavailable());
        }
        Ok(state.progress.clone())
    }

    async fn fetch_quiz_attempts(&self, quiz_id: QuizId) -> Result<Vec<QuizAttempt>, ApiError> {
        let state = self.lock();
        if state.failures.fetch_attempts_for.contains(&quiz_id) {
            return Err(unavailable());
        }
        Ok(state.attempts.get(&quiz_id).cloned().unwrap_or_default())
    }

    async fn start_quiz(&self, quiz_id: QuizId) -> Result<StartedAttempt, ApiError> {
        let started_at = self.clock.now();
        let mut state = self.lock();
        if state.failures.start_quiz {
            return Err(unavailable());
        }
        let questions = state
            .question_bank
            .get(&quiz_id)
            .cloned()
            .ok_or(ApiError::NotFound)?;

        let attempt_id = AttemptId::new(Uuid::new_v4());
        state.open_attempts.insert(
            attempt_id,
            OpenAttempt {
                quiz_id,
                answers: HashMap::new(),
            },
        );
        Ok(StartedAttempt {
            attempt_id,
            questions,
            started_at,
        })
    }

    async fn submit_answer(
        &self,
        attempt_id: AttemptId,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        if state.failures.submit_answer {
            return Err(unavailable());
        }
        let attempt = state
            .open_attempts
            .get_mut(&attempt_id)
            .ok_or(ApiError::NotFound)?;
        // Overwrite semantics, one answer per question.
        attempt.answers.insert(question_id, answer_id);
        Ok(())
    }

    async fn submit_quiz(&self, attempt_id: AttemptId) -> Result<QuizResult, ApiError> {
        let submitted_at = self.clock.now();
        let mut state = self.lock();
        if state.failures.submit_quiz {
            return Err(unavailable());
        }
        let open = state
            .open_attempts
            .remove(&attempt_id)
            .ok_or(ApiError::NotFound)?;
        let questions = state
            .question_bank
            .get(&open.quiz_id)
            .cloned()
            .ok_or(ApiError::NotFound)?;
        let passing_score = state
            .course
            .as_ref()
            .and_then(|c| c.quiz(open.quiz_id))
            .map_or(70, course_core::model::Quiz::passing_score);

        let (correct, score) = Self::grade(&questions, &open.answers);
        let passed = score >= f64::from(passing_score);

        let reviews = questions
            .iter()
            .map(|q| {
                let selected = open.answers.get(&q.id()).copied();
                let expected = q.answers().iter().find(|a| a.is_correct).map(|a| a.id);
                let is_correct = selected.is_some() && selected == expected;
                QuestionReview {
                    question_id: q.id(),
                    prompt: q.prompt().to_owned(),
                    selected_answer_id: selected,
                    correct_answer_id: expected,
                    is_correct,
                    points_earned: if is_correct { q.points() } else { 0 },
                }
            })
            .collect();
        state.reviews.insert(attempt_id, reviews);

        state.attempts.entry(open.quiz_id).or_default().push(QuizAttempt {
            id: attempt_id,
            passed,
            score,
            submitted_at,
        });

        Ok(QuizResult {
            score,
            correct_count: correct,
            total_questions: u32::try_from(questions.len()).unwrap_or(u32::MAX),
            passed,
            passing_score,
        })
    }

    async fn update_lesson_progress(
        &self,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, ApiError> {
        let now = self.clock.now();
        let mut state = self.lock();
        if state.failures.update_progress {
            return Err(unavailable());
        }
        let record = ProgressRecord {
            lesson_id: update.lesson_id,
            is_completed: update.is_completed,
            completed_at: update.is_completed.then_some(now),
            watch_time_secs: update.watch_time_secs.unwrap_or(0),
            last_position_secs: update.last_position_secs.unwrap_or(0),
        };
        state
            .progress
            .retain(|r| r.lesson_id != update.lesson_id);
        state.progress.push(record.clone());
        Ok(record)
    }

    async fn fetch_detailed_results(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<QuestionReview>, ApiError> {
        self.lock()
            .reviews
            .get(&attempt_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{
        Course, LessonContent, LessonId, QuestionKind, Quiz, QuizAnswer, Section, SectionId,
    };
    use course_core::time::fixed_now;
    use uuid::Uuid;

    fn api() -> InMemoryCourseApi {
        InMemoryCourseApi::new(Clock::fixed(fixed_now()))
    }

    fn quiz_id() -> QuizId {
        QuizId::new(Uuid::from_u128(100))
    }

    fn aid(n: u128) -> AnswerId {
        AnswerId::new(Uuid::from_u128(n))
    }

    fn question(n: u128, points: u32) -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(Uuid::from_u128(n)),
            format!("Q{n}"),
            QuestionKind::MultipleChoice,
            points,
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

    fn course() -> Course {
        let section_id = SectionId::new(Uuid::from_u128(1));
        let lesson = course_core::model::Lesson::new(
            LessonId::new(Uuid::from_u128(10)),
            "L1",
            1,
            false,
            LessonContent::Text { body: "b".into() },
        )
        .unwrap();
        Course::new(
            CourseId::new(Uuid::from_u128(1)),
            "Rust 101",
            "rust-101",
            None,
            vec![Section::new(section_id, "S1", 1, true, vec![lesson]).unwrap()],
            vec![Quiz::new(quiz_id(), section_id, 0, 60, 3).unwrap()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn grading_is_points_weighted() {
        let api = api();
        api.seed_course(course());
        api.seed_questions(quiz_id(), vec![question(1, 3), question(2, 1)]);

        let started = api.start_quiz(quiz_id()).await.unwrap();
        api.submit_answer(started.attempt_id, QuestionId::new(Uuid::from_u128(1)), aid(10))
            .await
            .unwrap();

        let result = api.submit_quiz(started.attempt_id).await.unwrap();
        assert_eq!(result.correct_count, 1);
        assert!((result.score - 75.0).abs() < f64::EPSILON);
        assert!(result.passed);
        assert_eq!(api.attempt_count(quiz_id()), 1);
    }

    #[tokio::test]
    async fn resubmitting_an_answer_overwrites_it() {
        let api = api();
        api.seed_course(course());
        api.seed_questions(quiz_id(), vec![question(1, 1)]);

        let started = api.start_quiz(quiz_id()).await.unwrap();
        let q = QuestionId::new(Uuid::from_u128(1));
        api.submit_answer(started.attempt_id, q, aid(11)).await.unwrap();
        api.submit_answer(started.attempt_id, q, aid(10)).await.unwrap();

        let recorded = api.recorded_answers(started.attempt_id);
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded.get(&q), Some(&aid(10)));
    }

    #[tokio::test]
    async fn failure_injection_is_per_operation_and_reversible() {
        let api = api();
        api.seed_course(course());

        api.fail_fetch_progress(true);
        assert!(api
            .fetch_course_progress(CourseId::new(Uuid::from_u128(1)))
            .await
            .is_err());
        // Other operations are unaffected.
        assert!(api.fetch_course_by_slug("rust-101").await.is_ok());

        api.fail_fetch_progress(false);
        assert!(api
            .fetch_course_progress(CourseId::new(Uuid::from_u128(1)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn progress_upsert_replaces_by_lesson() {
        let api = api();
        let lesson = LessonId::new(Uuid::from_u128(10));

        api.update_lesson_progress(ProgressUpdate {
            lesson_id: lesson,
            is_completed: false,
            watch_time_secs: Some(30),
            last_position_secs: Some(30),
        })
        .await
        .unwrap();
        api.update_lesson_progress(ProgressUpdate::completed(lesson))
            .await
            .unwrap();

        let records = api
            .fetch_course_progress(CourseId::new(Uuid::from_u128(1)))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_completed);
        assert_eq!(records[0].completed_at, Some(fixed_now()));
    }
}
