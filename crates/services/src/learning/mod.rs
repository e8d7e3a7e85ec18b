mod progress;
mod quiz_flow;
mod service;
mod session;

pub use progress::CourseProgressSummary;
pub use quiz_flow::{AdvanceOutcome, TickOutcome};
pub use service::{LearningFlowService, NextOutcome};
pub use session::{LearningSession, QuizPhase};
