//! Persisted shapes for questions and sessions.
//!
//! These mirror the domain types so adapters can serialize them without
//! leaking storage concerns into the domain layer. A session's questions and
//! interviewees travel as one JSON document; older documents may hold either
//! collection as an object keyed by id or index instead of an array, so
//! decoding accepts both and normalizes to an ordered sequence here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use interview_core::model::{
    Category, Feedback, FeedbackId, Interviewee, IntervieweeId, Question, QuestionId, Session,
    SessionId, SessionQuestion, SessionStep,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

//
// ─── COLLECTION SHAPE ──────────────────────────────────────────────────────────
//

/// A stored collection that is either an array or a keyed object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StoredCollection<T> {
    Seq(Vec<T>),
    Keyed(BTreeMap<String, T>),
}

impl<T> Default for StoredCollection<T> {
    fn default() -> Self {
        Self::Seq(Vec::new())
    }
}

impl<T> StoredCollection<T> {
    /// Flatten to a sequence. Keyed entries are ordered numerically when every
    /// key is an index, otherwise by key.
    fn into_vec(self) -> Vec<T> {
        match self {
            StoredCollection::Seq(items) => items,
            StoredCollection::Keyed(map) => {
                let mut entries: Vec<(String, T)> = map.into_iter().collect();
                if entries.iter().all(|(k, _)| k.parse::<u64>().is_ok()) {
                    entries.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
                }
                entries.into_iter().map(|(_, v)| v).collect()
            }
        }
    }
}

fn seq_or_keyed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<StoredCollection<T>>::deserialize(deserializer)
        .map(|c| c.unwrap_or_default().into_vec())
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub category: Category,
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id(),
            category: question.category(),
            text: question.text().to_owned(),
            completed: question.is_completed(),
            created_at: question.created_at(),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored text is blank.
    pub fn into_question(self) -> Result<Question, StorageError> {
        Question::from_persisted(
            self.id,
            self.category,
            self.text,
            self.completed,
            self.created_at,
        )
        .map_err(ser)
    }
}

//
// ─── SESSION DOCUMENT ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervieweeRecord {
    pub id: IntervieweeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    #[serde(alias = "name")]
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQuestionRecord {
    #[serde(flatten)]
    pub question: QuestionRecord,
    #[serde(default, alias = "interviewees", deserialize_with = "seq_or_keyed")]
    pub assigned_interviewees: Vec<IntervieweeId>,
    #[serde(default, deserialize_with = "seq_or_keyed")]
    pub feedbacks: Vec<FeedbackRecord>,
    #[serde(default)]
    pub session_completed: bool,
}

/// JSON body stored alongside the scalar session columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(default, deserialize_with = "seq_or_keyed")]
    pub questions: Vec<SessionQuestionRecord>,
    #[serde(default, deserialize_with = "seq_or_keyed")]
    pub interviewees: Vec<IntervieweeRecord>,
}

impl SessionDocument {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the JSON cannot be parsed.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(ser)
    }
}

/// Persisted shape for a whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub step: String,
    pub finished_at: Option<DateTime<Utc>>,
    pub document: SessionDocument,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let questions = session
            .questions()
            .iter()
            .map(|q| SessionQuestionRecord {
                question: QuestionRecord::from_question(q.question()),
                assigned_interviewees: q.assigned_interviewees().to_vec(),
                feedbacks: q
                    .feedbacks()
                    .iter()
                    .map(|fb| FeedbackRecord {
                        id: fb.id(),
                        author: fb.author().to_owned(),
                        content: fb.content().to_owned(),
                        timestamp: fb.timestamp(),
                    })
                    .collect(),
                session_completed: q.is_completed(),
            })
            .collect();
        let interviewees = session
            .interviewees()
            .iter()
            .map(|who| IntervieweeRecord {
                id: who.id(),
                name: who.name().to_owned(),
            })
            .collect();

        Self {
            id: session.id(),
            title: session.title().to_owned(),
            created_at: session.created_at(),
            step: session.step().as_str().to_owned(),
            finished_at: session.finished_at(),
            document: SessionDocument {
                questions,
                interviewees,
            },
        }
    }

    /// Convert the record back into a domain `Session`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if any field fails domain validation.
    pub fn into_session(self) -> Result<Session, StorageError> {
        let step: SessionStep = self.step.parse().map_err(ser)?;

        let mut questions = Vec::with_capacity(self.document.questions.len());
        for record in self.document.questions {
            let mut feedbacks = Vec::with_capacity(record.feedbacks.len());
            for fb in record.feedbacks {
                feedbacks.push(
                    Feedback::from_persisted(fb.id, fb.author, fb.content, fb.timestamp)
                        .map_err(ser)?,
                );
            }
            questions.push(SessionQuestion::from_persisted(
                record.question.into_question()?,
                record.assigned_interviewees,
                feedbacks,
                record.session_completed,
            ));
        }

        let mut interviewees = Vec::with_capacity(self.document.interviewees.len());
        for who in self.document.interviewees {
            interviewees.push(Interviewee::new(who.id, who.name).map_err(ser)?);
        }

        Session::from_persisted(
            self.id,
            self.title,
            self.created_at,
            step,
            self.finished_at,
            questions,
            interviewees,
        )
        .map_err(ser)
    }
}
