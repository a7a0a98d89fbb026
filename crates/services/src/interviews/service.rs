use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;

use interview_core::model::{
    CompletionPolicy, Feedback, FeedbackDraft, FeedbackId, Interviewee, IntervieweeId,
    QuestionId, Session, SessionId,
};
use interview_core::{QuestionSelector, SelectionPolicy};
use storage::repository::{QuestionRepository, SessionRepository, StorageError};

use super::view::{InterviewListItem, InterviewOrder, sort_sessions};
use crate::Clock;
use crate::error::InterviewServiceError;

/// Policies applied by `InterviewService`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterviewSettings {
    pub selection: SelectionPolicy,
    pub completion: CompletionPolicy,
}

/// Drives an interview from question selection to completion.
///
/// This service owns:
/// - the time source (`Clock`)
/// - the random source used for selection and pairing
/// - repository access
///
/// Every operation loads the session, applies one domain transition, and
/// writes the whole session back.
#[derive(Clone)]
pub struct InterviewService {
    clock: Clock,
    settings: InterviewSettings,
    questions: Arc<dyn QuestionRepository>,
    sessions: Arc<dyn SessionRepository>,
    rng: Arc<Mutex<StdRng>>,
}

impl InterviewService {
    /// Build a service seeded from the operating system.
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: InterviewSettings,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_rng(clock, settings, questions, sessions, StdRng::from_os_rng())
    }

    /// Build a service with a reproducible random source.
    #[must_use]
    pub fn with_seed(
        clock: Clock,
        settings: InterviewSettings,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn SessionRepository>,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            clock,
            settings,
            questions,
            sessions,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        clock: Clock,
        settings: InterviewSettings,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn SessionRepository>,
        rng: StdRng,
    ) -> Self {
        Self {
            clock,
            settings,
            questions,
            sessions,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    #[must_use]
    pub fn settings(&self) -> InterviewSettings {
        self.settings
    }

    /// Run `f` with the shared random source. The lock never spans an await.
    fn with_random<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    async fn load(&self, id: SessionId) -> Result<Session, InterviewServiceError> {
        match self.sessions.load_session(id).await {
            Ok(session) => Ok(session),
            Err(StorageError::NotFound) => Err(InterviewServiceError::SessionNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Select questions from the bank and persist a new interview.
    ///
    /// A blank or missing title falls back to one derived from the creation time.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` when the bank has no uncompleted
    /// questions (or too few under a strict selection policy).
    /// Returns `InterviewServiceError::Storage` if repository access fails.
    pub async fn create_interview(
        &self,
        title: Option<String>,
    ) -> Result<Session, InterviewServiceError> {
        let bank = self.questions.load_questions().await?;
        let selector = QuestionSelector::new(self.settings.selection);
        let plan = self.with_random(|rng| selector.select(&bank, rng))?;

        let session = Session::new(SessionId::generate(), title, self.clock.now(), plan.questions)?;
        self.sessions.save_session(&session).await?;
        tracing::info!(
            id = %session.id(),
            questions = session.questions().len(),
            basic = plan.basic_selected,
            backfilled = plan.backfilled,
            "interview created"
        );
        Ok(session)
    }

    /// Fetch an interview by id.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::SessionNotFound` if it does not exist.
    /// Returns `InterviewServiceError::Storage` on other repository failures.
    pub async fn get_interview(&self, id: SessionId) -> Result<Session, InterviewServiceError> {
        let session = self.load(id).await?;
        tracing::debug!(%id, step = %session.step(), "interview loaded");
        Ok(session)
    }

    /// List interviews in the requested order.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Storage` if repository access fails.
    pub async fn list_interviews(
        &self,
        order: InterviewOrder,
    ) -> Result<Vec<InterviewListItem>, InterviewServiceError> {
        let mut sessions = self.sessions.list_sessions().await?;
        sort_sessions(&mut sessions, order);
        tracing::debug!(count = sessions.len(), ?order, "interviews listed");
        Ok(sessions.iter().map(InterviewListItem::from_session).collect())
    }

    /// # Errors
    ///
    /// Returns `InterviewServiceError::SessionNotFound` if it does not exist.
    /// Returns `InterviewServiceError::Storage` on other repository failures.
    pub async fn delete_interview(&self, id: SessionId) -> Result<(), InterviewServiceError> {
        match self.sessions.delete_session(id).await {
            Ok(()) => {
                tracing::info!(%id, "interview deleted");
                Ok(())
            }
            Err(StorageError::NotFound) => Err(InterviewServiceError::SessionNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Accept the selected questions and start collecting interviewees.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` if the interview is past that step.
    pub async fn begin_collecting_interviewees(
        &self,
        id: SessionId,
    ) -> Result<Session, InterviewServiceError> {
        let mut session = self.load(id).await?;
        session.advance_to_interviewees()?;
        self.sessions.save_session(&session).await?;
        tracing::info!(%id, step = %session.step(), "interview step advanced");
        Ok(session)
    }

    /// Add an interviewee under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` outside the collecting step or
    /// for a blank name.
    pub async fn add_interviewee(
        &self,
        id: SessionId,
        name: &str,
    ) -> Result<Interviewee, InterviewServiceError> {
        let mut session = self.load(id).await?;
        let who = session
            .add_interviewee(IntervieweeId::generate(), name)?
            .clone();
        self.sessions.save_session(&session).await?;
        tracing::info!(%id, interviewee = %who.id(), "interviewee added");
        Ok(who)
    }

    /// Assign the interviewees collected on the interview and start it.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` with `InsufficientInterviewees`
    /// for fewer than 2 interviewees; nothing is written in that case.
    pub async fn prepare_interview(&self, id: SessionId) -> Result<Session, InterviewServiceError> {
        let mut session = self.load(id).await?;
        self.with_random(|rng| session.prepare(rng))?;
        self.sessions.save_session(&session).await?;
        tracing::info!(
            %id,
            interviewees = session.interviewees().len(),
            "interview prepared"
        );
        Ok(session)
    }

    /// Replace the interviewee pool with `interviewees` and assign them.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` with `InsufficientInterviewees`
    /// for fewer than 2 distinct interviewees; nothing is written in that case.
    pub async fn assign_interviewees(
        &self,
        id: SessionId,
        interviewees: Vec<Interviewee>,
    ) -> Result<Session, InterviewServiceError> {
        let mut session = self.load(id).await?;
        self.with_random(|rng| session.assign_interviewees(interviewees, rng))?;
        self.sessions.save_session(&session).await?;
        tracing::info!(
            %id,
            interviewees = session.interviewees().len(),
            "interviewees assigned"
        );
        Ok(session)
    }

    /// Record feedback on one interview question.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` for an unknown question, blank
    /// feedback, or a finished interview.
    pub async fn add_feedback(
        &self,
        id: SessionId,
        question_id: QuestionId,
        draft: FeedbackDraft,
    ) -> Result<Feedback, InterviewServiceError> {
        let mut session = self.load(id).await?;
        let feedback = session
            .add_feedback(question_id, draft, FeedbackId::generate(), self.clock.now())?
            .clone();
        self.sessions.save_session(&session).await?;
        tracing::info!(%id, question = %question_id, "feedback recorded");
        Ok(feedback)
    }

    /// Mark one interview question as answered. The bank is untouched.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` for an unknown question or a
    /// finished interview.
    pub async fn mark_question_complete(
        &self,
        id: SessionId,
        question_id: QuestionId,
    ) -> Result<Session, InterviewServiceError> {
        let mut session = self.load(id).await?;
        session.mark_question_complete(question_id)?;
        self.sessions.save_session(&session).await?;
        tracing::info!(
            %id,
            question = %question_id,
            remaining = session.remaining_questions(),
            "question marked complete"
        );
        Ok(session)
    }

    /// Finish the interview and mark its questions completed in the bank.
    ///
    /// Bank questions deleted since selection are skipped. The finished
    /// interview is saved only after every remaining bank update succeeded.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Session` if the interview is already
    /// finished, not started, or still has open questions under a strict policy.
    /// Returns `InterviewServiceError::Storage` if persistence fails.
    pub async fn complete_interview(
        &self,
        id: SessionId,
    ) -> Result<Session, InterviewServiceError> {
        let mut session = self.load(id).await?;
        let bank_ids = session.complete(self.clock.now(), self.settings.completion)?;

        for question_id in bank_ids {
            match self.questions.set_question_completed(question_id, true).await {
                Ok(()) => {}
                Err(StorageError::NotFound) => {
                    tracing::warn!(
                        %id,
                        question = %question_id,
                        "bank question no longer exists; skipping"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        self.sessions.save_session(&session).await?;
        tracing::info!(%id, "interview completed");
        Ok(session)
    }
}
