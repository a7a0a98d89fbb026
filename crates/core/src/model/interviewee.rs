use thiserror::Error;

use crate::model::ids::IntervieweeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntervieweeError {
    #[error("interviewee name cannot be empty")]
    EmptyName,
}

/// A person taking part in one interview session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interviewee {
    id: IntervieweeId,
    name: String,
}

impl Interviewee {
    /// # Errors
    ///
    /// Returns `IntervieweeError::EmptyName` if the name is empty after trimming.
    pub fn new(id: IntervieweeId, name: impl Into<String>) -> Result<Self, IntervieweeError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IntervieweeError::EmptyName);
        }
        Ok(Self {
            id,
            name: trimmed.to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> IntervieweeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
