use chrono::{DateTime, Utc};
use interview_core::model::{Category, Question, QuestionId, Session, SessionId};
use sqlx::Row;

use crate::record::{QuestionRecord, SessionDocument, SessionRecord, ser};
use crate::repository::StorageError;

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn question_id_from_str(raw: &str) -> Result<QuestionId, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn session_id_from_str(raw: &str) -> Result<SessionId, StorageError> {
    raw.parse().map_err(ser)
}

/// Category keys are stored as `Category::as_str` (`html-css`, `javascript`, ...).
pub(crate) fn parse_category(raw: &str) -> Result<Category, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let category: String = row.try_get("category").map_err(ser)?;
    let completed: i64 = row.try_get("completed").map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    QuestionRecord {
        id: question_id_from_str(&id)?,
        category: parse_category(&category)?,
        text: row.try_get("text").map_err(ser)?,
        completed: completed != 0,
        created_at,
    }
    .into_question()
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let document: String = row.try_get("document").map_err(ser)?;

    SessionRecord {
        id: session_id_from_str(&id)?,
        title: row.try_get("title").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
        step: row.try_get("step").map_err(ser)?,
        finished_at: row.try_get("finished_at").map_err(ser)?,
        document: SessionDocument::from_json(&document)?,
    }
    .into_session()
}
