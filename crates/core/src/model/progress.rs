use chrono::{DateTime, Utc};

use crate::model::ids::LessonId;

/// One per-lesson progress record as reported by the server.
///
/// Absence of a record for a lesson means "not completed". Duplicate records
/// for the same lesson are tolerated by consumers (completion is OR-ed).
///
/// This mirrors the server payload so the progression model can stay a pure
/// transform; it is a record, not a domain entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub lesson_id: LessonId,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub watch_time_secs: u32,
    pub last_position_secs: u32,
}

impl ProgressRecord {
    /// A completion-only record, used when marking a lesson done without
    /// playback telemetry.
    #[must_use]
    pub fn completed(lesson_id: LessonId, completed_at: DateTime<Utc>) -> Self {
        Self {
            lesson_id,
            is_completed: true,
            completed_at: Some(completed_at),
            watch_time_secs: 0,
            last_position_secs: 0,
        }
    }
}
