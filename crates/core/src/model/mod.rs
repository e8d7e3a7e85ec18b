mod course;
mod ids;
mod learner;
mod progress;
mod quiz;

pub use ids::{
    AnswerId, AttemptId, CourseId, LearnerId, LessonId, ParseIdError, QuestionId, QuizId,
    SectionId,
};

pub use course::{Course, CourseError, Lesson, LessonContent, Section};
pub use learner::LearnerContext;
pub use progress::ProgressRecord;
pub use quiz::{
    QuestionKind, QuestionReview, Quiz, QuizAnswer, QuizAttempt, QuizError, QuizQuestion,
    QuizResult,
};
