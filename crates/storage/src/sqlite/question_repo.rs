use quiz_core::model::{Question, QuestionId, Subject, ValidatedQuestion};
use sqlx::SqliteConnection;

use super::SqliteRepository;
use super::mapping::{map_question_row, question_id_from_i64, question_id_to_i64};
use crate::repository::{QuestionRepository, StorageError};

pub(super) fn db_err(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

/// Writes one row with the question's id as given.
pub(super) async fn insert_row(
    conn: &mut SqliteConnection,
    question: &Question,
) -> Result<(), sqlx::Error> {
    let [w1, w2, w3] = question.wrong_answers();
    sqlx::query(
        r"
        INSERT INTO questions (
            subject, id, question, correct_answer, wrong_answer1, wrong_answer2, wrong_answer3
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
    )
    .bind(question.subject().as_str())
    .bind(question_id_to_i64(question.id()))
    .bind(question.text())
    .bind(question.correct_answer())
    .bind(w1.as_str())
    .bind(w2.as_str())
    .bind(w3.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(&self, question: ValidatedQuestion) -> Result<Question, StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM questions WHERE subject = ?1",
        )
        .bind(question.subject().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let question = question.assign_id(question_id_from_i64(next)?);
        insert_row(&mut *tx, &question).await.map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        Ok(question)
    }

    async fn delete_question(&self, subject: Subject, id: QuestionId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let deleted = sqlx::query("DELETE FROM questions WHERE subject = ?1 AND id = ?2")
            .bind(subject.as_str())
            .bind(question_id_to_i64(id))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.map_err(db_err)?;
            return Err(StorageError::NotFound);
        }

        // Rewrite the tail with ids shifted down so the subject stays 1..=N.
        let rows = sqlx::query(
            r"
            SELECT id, question, correct_answer, wrong_answer1, wrong_answer2, wrong_answer3
            FROM questions
            WHERE subject = ?1 AND id > ?2
            ORDER BY id ASC
            ",
        )
        .bind(subject.as_str())
        .bind(question_id_to_i64(id))
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut tail = Vec::with_capacity(rows.len());
        for row in rows {
            tail.push(map_question_row(&row, subject)?);
        }

        sqlx::query("DELETE FROM questions WHERE subject = ?1 AND id > ?2")
            .bind(subject.as_str())
            .bind(question_id_to_i64(id))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let shifted = tail.len();
        for question in tail {
            let new_id = QuestionId::new(question.id().value() - 1);
            insert_row(&mut *tx, &question.with_id(new_id))
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        tracing::debug!(%subject, deleted = %id, shifted, "resequenced subject after delete");

        Ok(())
    }

    async fn list_questions(&self, subject: Subject) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question, correct_answer, wrong_answer1, wrong_answer2, wrong_answer3
            FROM questions
            WHERE subject = ?1
            ORDER BY id ASC
            ",
        )
        .bind(subject.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row, subject)?);
        }
        Ok(questions)
    }

    async fn count_questions(&self, subject: Subject) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE subject = ?1")
            .bind(subject.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        u32::try_from(count)
            .map_err(|_| StorageError::Serialization(format!("invalid count: {count}")))
    }
}
