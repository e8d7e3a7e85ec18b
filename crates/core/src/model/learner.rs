use crate::model::ids::LearnerId;

/// Read-only identity of the logged-in learner.
///
/// Passed explicitly into services that need it rather than living in
/// ambient global state; none of the progression logic reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerContext {
    id: LearnerId,
    display_name: String,
}

impl LearnerContext {
    #[must_use]
    pub fn new(id: LearnerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> LearnerId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}
