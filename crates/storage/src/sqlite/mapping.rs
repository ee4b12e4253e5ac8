use quiz_core::model::{Question, QuestionId, Subject};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    u32::try_from(v)
        .map(QuestionId::new)
        .map_err(|_| StorageError::Serialization(format!("question id out of range: {v}")))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> i64 {
    i64::from(id.value())
}

/// Maps a row carrying the question columns. The subject comes from the
/// caller because legacy tables have no subject column.
pub(crate) fn map_question_row(
    row: &sqlx::sqlite::SqliteRow,
    subject: Subject,
) -> Result<Question, StorageError> {
    Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        subject,
        row.try_get::<String, _>("question").map_err(ser)?,
        row.try_get::<String, _>("correct_answer").map_err(ser)?,
        [
            row.try_get::<String, _>("wrong_answer1").map_err(ser)?,
            row.try_get::<String, _>("wrong_answer2").map_err(ser)?,
            row.try_get::<String, _>("wrong_answer3").map_err(ser)?,
        ],
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_rejects_negative_values() {
        assert!(question_id_from_i64(-1).is_err());
        assert_eq!(question_id_from_i64(4).unwrap(), QuestionId::new(4));
    }
}
