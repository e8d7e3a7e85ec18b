use course_core::ProgressionView;

/// Aggregated view of course progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgressSummary {
    pub total_lessons: usize,
    pub completed_lessons: usize,
}

impl CourseProgressSummary {
    #[must_use]
    pub fn from_view(view: &ProgressionView) -> Self {
        Self {
            total_lessons: view.total_lessons(),
            completed_lessons: view.completed_lesson_count(),
        }
    }

    /// Whole-course completion percentage; an empty course reads as 0%.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total_lessons == 0 {
            return 0;
        }
        let pct = self.completed_lessons * 100 / self.total_lessons;
        u8::try_from(pct).unwrap_or(100)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons == self.total_lessons
    }
}
