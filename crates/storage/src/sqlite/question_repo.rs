use interview_core::model::{Question, QuestionId};

use super::SqliteRepository;
use super::mapping::{conn, map_question_row};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, category, text, completed, created_at
            FROM questions
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        tracing::debug!(count = questions.len(), "loaded question bank");
        Ok(questions)
    }

    async fn save_question(&self, question: &Question) -> Result<QuestionId, StorageError> {
        sqlx::query(
            r"
            INSERT INTO questions (id, category, text, completed, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                -- keep created_at from the original insert
                category = excluded.category,
                text = excluded.text,
                completed = excluded.completed
            ",
        )
        .bind(question.id().to_string())
        .bind(question.category().as_str())
        .bind(question.text().to_owned())
        .bind(i64::from(question.is_completed()))
        .bind(question.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(question.id())
    }

    async fn set_question_completed(
        &self,
        id: QuestionId,
        completed: bool,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE questions SET completed = ?1 WHERE id = ?2")
            .bind(i64::from(completed))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
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
