use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::FeedbackId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("feedback author cannot be empty")]
    EmptyAuthor,

    #[error("feedback content cannot be empty")]
    EmptyContent,
}

/// Unvalidated feedback input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub author: String,
    pub content: String,
}

impl FeedbackDraft {
    #[must_use]
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    /// Validate the draft and stamp it with an id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if author or content is blank.
    pub fn validate(self, id: FeedbackId, at: DateTime<Utc>) -> Result<Feedback, FeedbackError> {
        let author = self.author.trim();
        if author.is_empty() {
            return Err(FeedbackError::EmptyAuthor);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(FeedbackError::EmptyContent);
        }
        Ok(Feedback {
            id,
            author: author.to_owned(),
            content: content.to_owned(),
            timestamp: at,
        })
    }
}

/// Immutable feedback left on a session question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    id: FeedbackId,
    author: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Feedback {
    /// Rehydrate a feedback entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if the stored author or content is blank.
    pub fn from_persisted(
        id: FeedbackId,
        author: String,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, FeedbackError> {
        FeedbackDraft::new(author, content).validate(id, timestamp)
    }

    #[must_use]
    pub fn id(&self) -> FeedbackId {
        self.id
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
