use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::assignment::{pair_technical_questions, technical_assignment_counts};
use crate::model::feedback::{Feedback, FeedbackDraft, FeedbackError};
use crate::model::ids::{FeedbackId, IntervieweeId, QuestionId, SessionId};
use crate::model::interviewee::{Interviewee, IntervieweeError};
use crate::model::question::{Category, Question, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no uncompleted questions are available for a session")]
    InsufficientQuestions,

    #[error("at least 2 interviewees are required, got {count}")]
    InsufficientInterviewees { count: usize },

    #[error("question {0} is not part of this session")]
    QuestionNotFound(QuestionId),

    #[error("session is already finished")]
    SessionAlreadyFinished,

    #[error("session is in step {actual}, expected {expected}")]
    InvalidStep {
        expected: SessionStep,
        actual: SessionStep,
    },

    #[error("interviewee {0} is already part of this session")]
    DuplicateInterviewee(IntervieweeId),

    #[error("{remaining} question(s) are not complete yet")]
    QuestionsOutstanding { remaining: usize },

    #[error("invalid persisted session: {0}")]
    InvalidPersistedState(String),

    #[error(transparent)]
    Interviewee(#[from] IntervieweeError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// Preparation step of a session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionStep {
    CollectingQuestions,
    CollectingInterviewees,
    InProgress,
}

impl SessionStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStep::CollectingQuestions => "collecting_questions",
            SessionStep::CollectingInterviewees => "collecting_interviewees",
            SessionStep::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStep {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collecting_questions" => Ok(SessionStep::CollectingQuestions),
            "collecting_interviewees" => Ok(SessionStep::CollectingInterviewees),
            "in_progress" => Ok(SessionStep::InProgress),
            other => Err(SessionError::InvalidPersistedState(format!(
                "unknown step: {other}"
            ))),
        }
    }
}

//
// ─── COMPLETION POLICY ─────────────────────────────────────────────────────────
//

/// Rules applied when a session is marked finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPolicy {
    pub require_all_questions_complete: bool,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self {
            require_all_questions_complete: true,
        }
    }
}

//
// ─── SESSION QUESTION ──────────────────────────────────────────────────────────
//

/// Snapshot of a bank question plus session-scoped state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    question: Question,
    assigned: Vec<IntervieweeId>,
    feedbacks: Vec<Feedback>,
    completed: bool,
}

impl SessionQuestion {
    #[must_use]
    pub fn new(question: Question) -> Self {
        Self {
            question,
            assigned: Vec::new(),
            feedbacks: Vec::new(),
            completed: false,
        }
    }

    #[must_use]
    pub fn from_persisted(
        question: Question,
        assigned: Vec<IntervieweeId>,
        feedbacks: Vec<Feedback>,
        completed: bool,
    ) -> Self {
        Self {
            question,
            assigned,
            feedbacks,
            completed,
        }
    }

    /// Id of the bank question this snapshot was taken from.
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id()
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.question.category()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.question.text()
    }

    #[must_use]
    pub fn assigned_interviewees(&self) -> &[IntervieweeId] {
        &self.assigned
    }

    #[must_use]
    pub fn feedbacks(&self) -> &[Feedback] {
        &self.feedbacks
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One interview run, from question selection through completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    title: String,
    created_at: DateTime<Utc>,
    step: SessionStep,
    finished_at: Option<DateTime<Utc>>,
    questions: Vec<SessionQuestion>,
    interviewees: Vec<Interviewee>,
}

/// Title used when the caller does not supply one.
#[must_use]
pub fn default_title(created_at: DateTime<Utc>) -> String {
    format!("Interview {}", created_at.format("%Y-%m-%d %H:%M"))
}

impl Session {
    /// Start a session from already selected questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InsufficientQuestions` if `questions` is empty.
    pub fn new(
        id: SessionId,
        title: Option<String>,
        created_at: DateTime<Utc>,
        questions: Vec<Question>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::InsufficientQuestions);
        }
        let title = title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_title(created_at));

        Ok(Self {
            id,
            title,
            created_at,
            step: SessionStep::CollectingQuestions,
            finished_at: None,
            questions: questions.into_iter().map(SessionQuestion::new).collect(),
            interviewees: Vec::new(),
        })
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPersistedState` if interviewee ids repeat or a
    /// question references an interviewee the session does not own.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        title: String,
        created_at: DateTime<Utc>,
        step: SessionStep,
        finished_at: Option<DateTime<Utc>>,
        questions: Vec<SessionQuestion>,
        interviewees: Vec<Interviewee>,
    ) -> Result<Self, SessionError> {
        let mut known = HashSet::with_capacity(interviewees.len());
        for who in &interviewees {
            if !known.insert(who.id()) {
                return Err(SessionError::InvalidPersistedState(format!(
                    "duplicate interviewee {}",
                    who.id()
                )));
            }
        }
        for q in &questions {
            if let Some(stray) = q.assigned.iter().find(|id| !known.contains(id)) {
                return Err(SessionError::InvalidPersistedState(format!(
                    "question {} assigned to unknown interviewee {stray}",
                    q.id()
                )));
            }
        }

        Ok(Self {
            id,
            title,
            created_at,
            step,
            finished_at,
            questions,
            interviewees,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn step(&self) -> SessionStep {
        self.step
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn interviewees(&self) -> &[Interviewee] {
        &self.interviewees
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&SessionQuestion> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn interviewee(&self, id: IntervieweeId) -> Option<&Interviewee> {
        self.interviewees.iter().find(|i| i.id() == id)
    }

    /// Number of questions not yet marked complete.
    #[must_use]
    pub fn remaining_questions(&self) -> usize {
        self.questions.iter().filter(|q| !q.completed).count()
    }

    /// Technical-question assignment count per interviewee, in interviewee order.
    #[must_use]
    pub fn assignment_counts(&self) -> Vec<(IntervieweeId, usize)> {
        technical_assignment_counts(&self.questions, &self.interviewees)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::SessionAlreadyFinished);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: SessionStep) -> Result<(), SessionError> {
        if self.step != expected {
            return Err(SessionError::InvalidStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn question_mut(&mut self, id: QuestionId) -> Result<&mut SessionQuestion, SessionError> {
        self.questions
            .iter_mut()
            .find(|q| q.id() == id)
            .ok_or(SessionError::QuestionNotFound(id))
    }

    /// Move from reviewing the selected questions to collecting interviewees.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStep` unless the session is collecting questions.
    pub fn advance_to_interviewees(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.ensure_step(SessionStep::CollectingQuestions)?;
        self.step = SessionStep::CollectingInterviewees;
        Ok(())
    }

    /// Add an interviewee while the session is collecting them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStep` outside the collecting step and
    /// `SessionError::Interviewee` for a blank name.
    pub fn add_interviewee(
        &mut self,
        id: IntervieweeId,
        name: impl Into<String>,
    ) -> Result<&Interviewee, SessionError> {
        self.ensure_open()?;
        self.ensure_step(SessionStep::CollectingInterviewees)?;
        let who = Interviewee::new(id, name)?;
        if self.interviewee(who.id()).is_some() {
            return Err(SessionError::DuplicateInterviewee(who.id()));
        }
        self.interviewees.push(who);
        let idx = self.interviewees.len() - 1;
        Ok(&self.interviewees[idx])
    }

    /// Replace the interviewee pool and assign interviewees to every question.
    ///
    /// The basic question gets everyone; each technical question gets a pair chosen
    /// to keep per-interviewee load balanced. Re-running replaces earlier assignments.
    /// On error the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InsufficientInterviewees` for fewer than 2 distinct
    /// interviewees and `SessionError::SessionAlreadyFinished` once finished.
    pub fn assign_interviewees<R: Rng + ?Sized>(
        &mut self,
        interviewees: Vec<Interviewee>,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        self.ensure_open()?;

        let mut seen = HashSet::with_capacity(interviewees.len());
        let pool: Vec<Interviewee> = interviewees
            .into_iter()
            .filter(|who| seen.insert(who.id()))
            .collect();
        if pool.len() < 2 {
            return Err(SessionError::InsufficientInterviewees { count: pool.len() });
        }

        let technical = self
            .questions
            .iter()
            .filter(|q| q.category().is_technical())
            .count();
        let pairs = pair_technical_questions(pool.len(), technical, rng)?;
        let everyone: Vec<IntervieweeId> = pool.iter().map(Interviewee::id).collect();

        let mut pairs = pairs.into_iter();
        for q in &mut self.questions {
            q.assigned = if q.category().is_basic() {
                everyone.clone()
            } else {
                match pairs.next() {
                    Some((a, b)) => vec![everyone[a], everyone[b]],
                    None => Vec::new(),
                }
            };
        }

        self.interviewees = pool;
        self.step = SessionStep::InProgress;
        Ok(())
    }

    /// Assign the interviewees collected on this session.
    ///
    /// # Errors
    ///
    /// Same as [`Session::assign_interviewees`].
    pub fn prepare<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        let pool = self.interviewees.clone();
        self.assign_interviewees(pool, rng)
    }

    /// Append feedback to a session question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionNotFound` for an unknown id; nothing is appended.
    pub fn add_feedback(
        &mut self,
        question_id: QuestionId,
        draft: FeedbackDraft,
        feedback_id: FeedbackId,
        at: DateTime<Utc>,
    ) -> Result<&Feedback, SessionError> {
        self.ensure_open()?;
        let feedback = draft.validate(feedback_id, at)?;
        let question = self.question_mut(question_id)?;
        question.feedbacks.push(feedback);
        let idx = question.feedbacks.len() - 1;
        Ok(&question.feedbacks[idx])
    }

    /// Mark one session question as answered. Does not touch the bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionNotFound` for an unknown id.
    pub fn mark_question_complete(&mut self, question_id: QuestionId) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.question_mut(question_id)?.completed = true;
        Ok(())
    }

    /// Finish the session and return the bank question ids whose `completed`
    /// flag must be propagated.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionAlreadyFinished` on a repeated call,
    /// `SessionError::InvalidStep` before interviewees are assigned, and
    /// `SessionError::QuestionsOutstanding` when the policy requires every question
    /// to be complete. The session is unchanged on error.
    pub fn complete(
        &mut self,
        at: DateTime<Utc>,
        policy: CompletionPolicy,
    ) -> Result<Vec<QuestionId>, SessionError> {
        self.ensure_open()?;
        self.ensure_step(SessionStep::InProgress)?;
        let remaining = self.remaining_questions();
        if policy.require_all_questions_complete && remaining > 0 {
            return Err(SessionError::QuestionsOutstanding { remaining });
        }

        self.finished_at = Some(at);
        Ok(self.questions.iter().map(SessionQuestion::id).collect())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionText;
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(category: Category, text: &str) -> Question {
        Question::new(
            QuestionId::generate(),
            category,
            QuestionText::new(text).unwrap(),
            fixed_now(),
        )
    }

    fn people(names: &[&str]) -> Vec<Interviewee> {
        names
            .iter()
            .map(|n| Interviewee::new(IntervieweeId::generate(), *n).unwrap())
            .collect()
    }

    fn build_session() -> Session {
        Session::new(
            SessionId::generate(),
            None,
            fixed_now(),
            vec![
                question(Category::Cs, "What is a process?"),
                question(Category::React, "What is reconciliation?"),
                question(Category::JavaScript, "Explain hoisting."),
                question(Category::Basic, "Tell me about yourself."),
            ],
        )
        .unwrap()
    }

    fn in_progress_session() -> Session {
        let mut session = build_session();
        let mut rng = StdRng::seed_from_u64(7);
        session
            .assign_interviewees(people(&["A", "B", "C"]), &mut rng)
            .unwrap();
        session
    }

    #[test]
    fn new_session_uses_default_title_and_first_step() {
        let session = build_session();
        assert_eq!(session.title(), "Interview 2023-11-14 22:13");
        assert_eq!(session.step(), SessionStep::CollectingQuestions);
        assert!(!session.is_finished());
        assert!(session.questions().iter().all(|q| {
            q.assigned_interviewees().is_empty() && q.feedbacks().is_empty() && !q.is_completed()
        }));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = Session::new(SessionId::generate(), None, fixed_now(), Vec::new()).unwrap_err();
        assert_eq!(err, SessionError::InsufficientQuestions);
    }

    #[test]
    fn steps_only_move_forward() {
        let mut session = build_session();
        session.advance_to_interviewees().unwrap();
        assert_eq!(session.step(), SessionStep::CollectingInterviewees);

        let err = session.advance_to_interviewees().unwrap_err();
        assert!(matches!(err, SessionError::InvalidStep { .. }));
    }

    #[test]
    fn interviewees_are_only_added_while_collecting() {
        let mut session = build_session();
        let err = session
            .add_interviewee(IntervieweeId::generate(), "Ada")
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidStep {
                expected: SessionStep::CollectingInterviewees,
                actual: SessionStep::CollectingQuestions,
            }
        );

        session.advance_to_interviewees().unwrap();
        session.add_interviewee(IntervieweeId::generate(), "Ada").unwrap();
        assert_eq!(session.interviewees().len(), 1);
    }

    #[test]
    fn assignment_covers_basic_and_pairs_technical() {
        let session = in_progress_session();
        assert_eq!(session.step(), SessionStep::InProgress);

        let ids: Vec<_> = session.interviewees().iter().map(Interviewee::id).collect();
        for q in session.questions() {
            if q.category().is_basic() {
                assert_eq!(q.assigned_interviewees(), ids.as_slice());
            } else {
                let assigned = q.assigned_interviewees();
                assert_eq!(assigned.len(), 2);
                assert_ne!(assigned[0], assigned[1]);
                assert!(assigned.iter().all(|id| ids.contains(id)));
            }
        }
    }

    #[test]
    fn single_interviewee_leaves_session_unmodified() {
        let mut session = build_session();
        let before = session.clone();
        let mut rng = StdRng::seed_from_u64(1);

        let err = session
            .assign_interviewees(people(&["Solo"]), &mut rng)
            .unwrap_err();

        assert_eq!(err, SessionError::InsufficientInterviewees { count: 1 });
        assert_eq!(session, before);
    }

    #[test]
    fn duplicate_interviewees_count_once() {
        let mut session = build_session();
        let solo = people(&["Solo"]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = session
            .assign_interviewees(vec![solo[0].clone(), solo[0].clone()], &mut rng)
            .unwrap_err();
        assert_eq!(err, SessionError::InsufficientInterviewees { count: 1 });
    }

    #[test]
    fn reassignment_replaces_previous_assignments() {
        let mut session = in_progress_session();
        let mut rng = StdRng::seed_from_u64(99);
        let pool = people(&["D", "E"]);
        session.assign_interviewees(pool.clone(), &mut rng).unwrap();

        let ids: Vec<_> = pool.iter().map(Interviewee::id).collect();
        assert_eq!(session.interviewees().len(), 2);
        for q in session.questions() {
            assert_eq!(q.assigned_interviewees().len(), 2);
            assert!(q.assigned_interviewees().iter().all(|id| ids.contains(id)));
        }
    }

    #[test]
    fn prepare_uses_collected_interviewees() {
        let mut session = build_session();
        session.advance_to_interviewees().unwrap();
        session.add_interviewee(IntervieweeId::generate(), "A").unwrap();
        session.add_interviewee(IntervieweeId::generate(), "B").unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        session.prepare(&mut rng).unwrap();

        assert_eq!(session.step(), SessionStep::InProgress);
        assert_eq!(session.interviewees().len(), 2);
    }

    #[test]
    fn feedback_for_unknown_question_appends_nothing() {
        let mut session = in_progress_session();
        let before = session.clone();

        let err = session
            .add_feedback(
                QuestionId::generate(),
                FeedbackDraft::new("Kim", "Solid"),
                FeedbackId::generate(),
                fixed_now(),
            )
            .unwrap_err();

        assert!(matches!(err, SessionError::QuestionNotFound(_)));
        assert_eq!(session, before);
    }

    #[test]
    fn feedback_is_appended_in_order() {
        let mut session = in_progress_session();
        let qid = session.questions()[0].id();
        for (author, content) in [("Kim", "first"), ("Lee", "second")] {
            session
                .add_feedback(
                    qid,
                    FeedbackDraft::new(author, content),
                    FeedbackId::generate(),
                    fixed_now(),
                )
                .unwrap();
        }
        let contents: Vec<_> = session
            .question(qid)
            .unwrap()
            .feedbacks()
            .iter()
            .map(Feedback::content)
            .collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn completion_requires_all_questions_by_default() {
        let mut session = in_progress_session();
        let first = session.questions()[0].id();
        session.mark_question_complete(first).unwrap();

        let err = session
            .complete(fixed_now(), CompletionPolicy::default())
            .unwrap_err();
        assert_eq!(err, SessionError::QuestionsOutstanding { remaining: 3 });
        assert!(!session.is_finished());
    }

    #[test]
    fn lenient_policy_allows_early_completion() {
        let mut session = in_progress_session();
        let policy = CompletionPolicy {
            require_all_questions_complete: false,
        };
        let ids = session.complete(fixed_now(), policy).unwrap();
        assert_eq!(ids.len(), 4);
        assert!(session.is_finished());
    }

    #[test]
    fn second_completion_fails_and_changes_nothing() {
        let mut session = in_progress_session();
        let ids: Vec<_> = session.questions().iter().map(SessionQuestion::id).collect();
        for id in &ids {
            session.mark_question_complete(*id).unwrap();
        }
        let propagated = session
            .complete(fixed_now(), CompletionPolicy::default())
            .unwrap();
        assert_eq!(propagated, ids);

        let snapshot = session.clone();
        let err = session
            .complete(fixed_now() + chrono::Duration::hours(1), CompletionPolicy::default())
            .unwrap_err();
        assert_eq!(err, SessionError::SessionAlreadyFinished);
        assert_eq!(session, snapshot);
    }

    #[test]
    fn completion_before_assignment_is_rejected() {
        let mut session = build_session();
        let err = session
            .complete(fixed_now(), CompletionPolicy::default())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidStep { .. }));
    }

    #[test]
    fn persisted_session_rejects_unknown_assignees() {
        let q = SessionQuestion::from_persisted(
            question(Category::Cs, "Stack vs heap?"),
            vec![IntervieweeId::generate()],
            Vec::new(),
            false,
        );
        let err = Session::from_persisted(
            SessionId::generate(),
            "t".into(),
            fixed_now(),
            SessionStep::InProgress,
            None,
            vec![q],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::InvalidPersistedState(_)));
    }

    #[test]
    fn step_round_trips_through_str() {
        for step in [
            SessionStep::CollectingQuestions,
            SessionStep::CollectingInterviewees,
            SessionStep::InProgress,
        ] {
            assert_eq!(step.as_str().parse::<SessionStep>().unwrap(), step);
        }
    }
}
