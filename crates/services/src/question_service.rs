use std::sync::Arc;

use interview_core::model::{Category, Question, QuestionError, QuestionId, QuestionText};
use storage::repository::{QuestionRepository, StorageError};

use crate::Clock;
use crate::error::QuestionServiceError;

/// Bank questions of one category, as shown in a grouped listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub questions: Vec<Question>,
}

/// Orchestrates question bank edits and listings.
#[derive(Clone)]
pub struct QuestionBankService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionBankService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { clock, questions }
    }

    /// Add one question to the bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` for blank text.
    /// Returns `QuestionServiceError::Storage` if persistence fails.
    pub async fn add_question(
        &self,
        category: Category,
        text: impl Into<String>,
    ) -> Result<Question, QuestionServiceError> {
        let question = Question::new(
            QuestionId::generate(),
            category,
            QuestionText::new(text)?,
            self.clock.now(),
        );
        self.questions.save_question(&question).await?;
        tracing::info!(id = %question.id(), %category, "question added");
        Ok(question)
    }

    /// Add one question per non-blank line of `block`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` if no line has any text.
    /// Returns `QuestionServiceError::Storage` if persistence fails; lines
    /// saved before the failure stay in the bank.
    pub async fn add_questions(
        &self,
        category: Category,
        block: &str,
    ) -> Result<Vec<Question>, QuestionServiceError> {
        let texts: Vec<QuestionText> = block
            .lines()
            .filter_map(|line| QuestionText::new(line).ok())
            .collect();
        if texts.is_empty() {
            return Err(QuestionError::EmptyText.into());
        }

        let now = self.clock.now();
        let mut added = Vec::with_capacity(texts.len());
        for text in texts {
            let question = Question::new(QuestionId::generate(), category, text, now);
            self.questions.save_question(&question).await?;
            added.push(question);
        }
        tracing::info!(count = added.len(), %category, "questions added");
        Ok(added)
    }

    /// List bank questions in creation order, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn list_questions(
        &self,
        filter: Option<Category>,
    ) -> Result<Vec<Question>, QuestionServiceError> {
        let mut questions = self.questions.load_questions().await?;
        if let Some(category) = filter {
            questions.retain(|q| q.category() == category);
        }
        tracing::debug!(count = questions.len(), "questions loaded");
        Ok(questions)
    }

    /// Group the bank by category in display order. Empty categories are kept.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn grouped_questions(&self) -> Result<Vec<CategoryGroup>, QuestionServiceError> {
        let questions = self.list_questions(None).await?;
        Ok(Category::ALL
            .iter()
            .map(|&category| CategoryGroup {
                category,
                questions: questions
                    .iter()
                    .filter(|q| q.category() == category)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    /// Manually check or uncheck a bank question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::QuestionNotFound` for an unknown id.
    /// Returns `QuestionServiceError::Storage` if persistence fails.
    pub async fn set_question_completed(
        &self,
        id: QuestionId,
        completed: bool,
    ) -> Result<(), QuestionServiceError> {
        self.questions
            .set_question_completed(id, completed)
            .await
            .map_err(|e| not_found_as(e, id))?;
        tracing::info!(%id, completed, "question completion changed");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuestionServiceError::QuestionNotFound` for an unknown id.
    /// Returns `QuestionServiceError::Storage` if persistence fails.
    pub async fn delete_question(&self, id: QuestionId) -> Result<(), QuestionServiceError> {
        self.questions
            .delete_question(id)
            .await
            .map_err(|e| not_found_as(e, id))?;
        tracing::info!(%id, "question deleted");
        Ok(())
    }
}

fn not_found_as(err: StorageError, id: QuestionId) -> QuestionServiceError {
    match err {
        StorageError::NotFound => QuestionServiceError::QuestionNotFound(id),
        other => QuestionServiceError::Storage(other),
    }
}
