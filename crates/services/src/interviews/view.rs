use chrono::{DateTime, Utc};

use interview_core::model::{Session, SessionId, SessionStep};

/// Question texts shown in a list preview before collapsing the rest.
pub const PREVIEW_QUESTIONS: usize = 3;

/// Ordering for interview listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterviewOrder {
    #[default]
    Latest,
    Oldest,
}

/// Presentation-agnostic list item for an interview.
///
/// Timestamps stay raw; callers format them as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewListItem {
    pub id: SessionId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub step: SessionStep,
    pub finished_at: Option<DateTime<Utc>>,
    pub question_count: usize,
    pub interviewee_count: usize,
    pub preview: Vec<String>,
    pub more: usize,
}

impl InterviewListItem {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let questions = session.questions();
        let preview: Vec<String> = questions
            .iter()
            .take(PREVIEW_QUESTIONS)
            .map(|q| q.text().to_owned())
            .collect();
        Self {
            id: session.id(),
            title: session.title().to_owned(),
            created_at: session.created_at(),
            step: session.step(),
            finished_at: session.finished_at(),
            question_count: questions.len(),
            interviewee_count: session.interviewees().len(),
            more: questions.len() - preview.len(),
            preview,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Preview line such as `a, b, c ... and 2 more`.
    #[must_use]
    pub fn preview_line(&self) -> String {
        let joined = self.preview.join(", ");
        if self.more > 0 {
            format!("{joined} ... and {} more", self.more)
        } else {
            joined
        }
    }
}

/// Sort sessions for display. Ties on the creation timestamp fall back to id.
pub fn sort_sessions(sessions: &mut [Session], order: InterviewOrder) {
    sessions.sort_by_key(|s| (s.created_at(), s.id()));
    if order == InterviewOrder::Latest {
        sessions.reverse();
    }
}
