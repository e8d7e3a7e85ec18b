#![forbid(unsafe_code)]

pub mod error;
pub mod learning;

pub use course_core::Clock;

pub use error::{FlowError, Rejection};
pub use learning::{
    AdvanceOutcome, CourseProgressSummary, LearningFlowService, LearningSession, NextOutcome,
    QuizPhase, TickOutcome,
};
