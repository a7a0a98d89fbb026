use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Fixed set of question categories.
///
/// `Basic` is the distinguished experience/behavioral category; every other
/// variant is technical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Cs,
    HtmlCss,
    #[serde(rename = "javascript")]
    JavaScript,
    #[serde(rename = "typescript")]
    TypeScript,
    React,
    Basic,
}

impl Category {
    /// All categories in display order, basic last.
    pub const ALL: [Category; 6] = [
        Category::Cs,
        Category::HtmlCss,
        Category::JavaScript,
        Category::TypeScript,
        Category::React,
        Category::Basic,
    ];

    #[must_use]
    pub fn is_basic(self) -> bool {
        matches!(self, Category::Basic)
    }

    #[must_use]
    pub fn is_technical(self) -> bool {
        !self.is_basic()
    }

    /// Stable key used by storage adapters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cs => "cs",
            Category::HtmlCss => "html-css",
            Category::JavaScript => "javascript",
            Category::TypeScript => "typescript",
            Category::React => "react",
            Category::Basic => "basic",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Cs => "CS",
            Category::HtmlCss => "HTML/CSS",
            Category::JavaScript => "JavaScript",
            Category::TypeScript => "TypeScript",
            Category::React => "React",
            Category::Basic => "Basic (experience)",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = QuestionError;

    /// Accepts either the storage key or the display label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| QuestionError::UnknownCategory(needle.to_owned()))
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Validated question text (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionText(String);

impl QuestionText {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if the text is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, QuestionError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A question in the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    category: Category,
    text: QuestionText,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Question {
    /// Create a fresh, uncompleted question.
    #[must_use]
    pub fn new(
        id: QuestionId,
        category: Category,
        text: QuestionText,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            category,
            text,
            completed: false,
            created_at,
        }
    }

    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if the stored text is blank.
    pub fn from_persisted(
        id: QuestionId,
        category: Category,
        text: impl Into<String>,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionError> {
        Ok(Self {
            id,
            category,
            text: QuestionText::new(text)?,
            completed,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
