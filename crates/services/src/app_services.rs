use std::sync::Arc;

use interview_core::model::Category;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::interviews::{InterviewService, InterviewSettings};
use crate::question_service::QuestionBankService;

/// Starter bank written by [`AppServices::seed_sample_questions`].
const SAMPLE_QUESTIONS: &[(Category, &str)] = &[
    (Category::Cs, "What is the difference between a process and a thread?"),
    (Category::Cs, "How does a hash map handle collisions?"),
    (Category::HtmlCss, "Explain the CSS box model."),
    (Category::HtmlCss, "When would you use grid instead of flexbox?"),
    (Category::JavaScript, "What is a closure?"),
    (Category::JavaScript, "How does the event loop schedule microtasks?"),
    (Category::TypeScript, "What is the difference between `unknown` and `any`?"),
    (Category::TypeScript, "How do discriminated unions narrow types?"),
    (Category::React, "Why do list items need a `key`?"),
    (Category::React, "When does `useEffect` run?"),
    (Category::Basic, "Tell us about a project you are proud of."),
    (Category::Basic, "Describe a disagreement with a teammate and how it ended."),
];

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<QuestionBankService>,
    interviews: Arc<InterviewService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// A `seed` makes question selection and pairing reproducible.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: InterviewSettings,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings, seed))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, settings: InterviewSettings, seed: Option<u64>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, settings, seed)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        settings: InterviewSettings,
        seed: Option<u64>,
    ) -> Self {
        let questions = Arc::new(QuestionBankService::new(
            clock,
            Arc::clone(&storage.questions),
        ));
        let question_repo = Arc::clone(&storage.questions);
        let session_repo = Arc::clone(&storage.sessions);
        let interviews = Arc::new(match seed {
            Some(seed) => {
                InterviewService::with_seed(clock, settings, question_repo, session_repo, seed)
            }
            None => InterviewService::new(clock, settings, question_repo, session_repo),
        });
        Self {
            questions,
            interviews,
        }
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn interviews(&self) -> Arc<InterviewService> {
        Arc::clone(&self.interviews)
    }

    /// Fill an empty bank with a starter set. Returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bank cannot be read or written.
    pub async fn seed_sample_questions(&self) -> Result<usize, AppServicesError> {
        if !self.questions.list_questions(None).await?.is_empty() {
            return Ok(0);
        }
        for (category, text) in SAMPLE_QUESTIONS {
            self.questions.add_question(*category, *text).await?;
        }
        Ok(SAMPLE_QUESTIONS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::time::fixed_clock;

    #[tokio::test]
    async fn sample_questions_seed_only_an_empty_bank() {
        let storage = Storage::in_memory();
        let services =
            AppServices::from_storage(&storage, fixed_clock(), InterviewSettings::default(), Some(1));

        let added = services.seed_sample_questions().await.unwrap();
        assert_eq!(added, SAMPLE_QUESTIONS.len());
        assert_eq!(services.seed_sample_questions().await.unwrap(), 0);
        assert_eq!(
            storage.questions.load_questions().await.unwrap().len(),
            SAMPLE_QUESTIONS.len()
        );
    }

    #[tokio::test]
    async fn sample_bank_supports_a_full_interview() {
        let services = AppServices::in_memory(fixed_clock(), InterviewSettings::default(), Some(3));
        services.seed_sample_questions().await.unwrap();

        let session = services.interviews().create_interview(None).await.unwrap();
        assert_eq!(session.questions().len(), 6);
        assert!(session.questions()[5].category().is_basic());
    }
}
