//! Pure domain core for the course learning client: entity snapshots, the
//! progression/unlock model, the quiz attempt state machine, and the linear
//! navigation cursor. No I/O lives here; callers own all fetching.

#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod navigation;
pub mod progression;
pub mod quiz_session;
pub mod time;

pub use error::Error;
pub use time::Clock;

pub use navigation::{LessonRef, NavigationCursor, NextStep, flatten_lessons};
pub use progression::{ProgressionView, QuizStatus, SectionView, build_progression_view};
pub use quiz_session::{Advance, QuizSession, QuizSessionError};
