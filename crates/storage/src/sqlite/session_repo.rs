use interview_core::model::{Session, SessionId};

use super::SqliteRepository;
use super::mapping::{conn, map_session_row};
use crate::record::SessionRecord;
use crate::repository::{SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn load_session(&self, id: SessionId) -> Result<Session, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, created_at, step, finished_at, document
            FROM sessions
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_session_row(&row)
    }

    async fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let record = SessionRecord::from_session(session);
        let document = record.document.to_json()?;

        sqlx::query(
            r"
            INSERT INTO sessions (id, title, created_at, step, finished_at, document)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                step = excluded.step,
                finished_at = excluded.finished_at,
                document = excluded.document
            ",
        )
        .bind(record.id.to_string())
        .bind(record.title)
        .bind(record.created_at)
        .bind(record.step)
        .bind(record.finished_at)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(session = %session.id(), step = %session.step(), "saved session");
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, created_at, step, finished_at, document
            FROM sessions
            ORDER BY created_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(map_session_row(&row)?);
        }
        Ok(sessions)
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
