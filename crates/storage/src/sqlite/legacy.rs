use chrono::Utc;
use quiz_core::model::{QuestionDraft, Subject};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::SqliteInitError;
use super::mapping::question_id_from_i64;
use super::question_repo::insert_row;

/// Outcome of copying the old per-subject tables into `questions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyImport {
    /// Rows copied, per subject imported by this run.
    pub imported: Vec<(Subject, u32)>,
    /// Rows left behind because a field was blank, per subject with any.
    pub skipped: Vec<(Subject, u32)>,
    /// Subjects whose legacy table had been imported by an earlier run.
    pub already_imported: Vec<Subject>,
}

impl LegacyImport {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.imported.iter().map(|(_, n)| n).sum()
    }

    #[must_use]
    pub fn total_skipped(&self) -> u32 {
        self.skipped.iter().map(|(_, n)| n).sum()
    }
}

struct LegacyRow {
    id: i64,
    text: String,
    correct: String,
    wrong: [String; 3],
}

impl LegacyRow {
    fn read(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            text: row.try_get("question")?,
            correct: row.try_get("correct_answer")?,
            wrong: [
                row.try_get("wrong_answer1")?,
                row.try_get("wrong_answer2")?,
                row.try_get("wrong_answer3")?,
            ],
        })
    }
}

/// Copies each `Math`, `Science`, ... table that exists into `questions`.
///
/// Rows keep their legacy order and are appended after the subject's
/// current maximum id. Rows with a blank field are skipped and counted.
/// Each subject is copied at most once: the copy and its `legacy_imports`
/// marker commit in the same transaction, and later runs skip the subject.
/// Table names come from the closed subject catalog.
pub async fn import_legacy_tables(pool: &SqlitePool) -> Result<LegacyImport, SqliteInitError> {
    let mut report = LegacyImport::default();

    for subject in Subject::ALL {
        let table = subject.as_str();
        let exists = sqlx::query("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .bind(table)
            .fetch_optional(pool)
            .await?
            .is_some();
        if !exists {
            continue;
        }

        let mut tx = pool.begin().await?;

        let done = sqlx::query("SELECT 1 FROM legacy_imports WHERE subject = ?1")
            .bind(table)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if done {
            tracing::info!(%subject, "legacy table already imported");
            report.already_imported.push(subject);
            continue;
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT id, question, correct_answer, wrong_answer1, wrong_answer2, wrong_answer3
            FROM "{table}"
            ORDER BY id ASC
            "#
        ))
        .fetch_all(&mut *tx)
        .await?;

        let max: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM questions WHERE subject = ?1")
                .bind(table)
                .fetch_one(&mut *tx)
                .await?;
        let mut next = question_id_from_i64(max)
            .map_err(|e| SqliteInitError::Legacy {
                table,
                reason: e.to_string(),
            })?
            .next();

        let mut copied = 0_u32;
        let mut skipped = 0_u32;
        for row in &rows {
            let legacy = LegacyRow::read(row).map_err(|e| SqliteInitError::Legacy {
                table,
                reason: e.to_string(),
            })?;
            let draft = QuestionDraft::new(subject, legacy.text, legacy.correct, legacy.wrong);
            let question = match draft.validate() {
                Ok(valid) => valid.assign_id(next),
                Err(reason) => {
                    tracing::warn!(%subject, legacy_id = legacy.id, %reason, "skipping legacy row");
                    skipped += 1;
                    continue;
                }
            };
            insert_row(&mut *tx, &question).await?;
            next = next.next();
            copied += 1;
        }

        sqlx::query(
            r"
            INSERT INTO legacy_imports (subject, imported_rows, skipped_rows, imported_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(table)
        .bind(i64::from(copied))
        .bind(i64::from(skipped))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(%subject, copied, skipped, "imported legacy questions");
        report.imported.push((subject, copied));
        if skipped > 0 {
            report.skipped.push((subject, skipped));
        }
    }

    Ok(report)
}
