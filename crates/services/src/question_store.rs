use std::sync::Arc;

use quiz_core::model::{Question, QuestionDraft, QuestionId, Subject, WRONG_ANSWER_COUNT};
use storage::repository::{QuestionRepository, StorageError};

use crate::error::QuestionStoreError;

/// Subject-scoped CRUD over the question bank.
///
/// Ids within a subject are always `1..=N`: new questions get the next id and
/// deletes renumber the questions after the removed one.
#[derive(Clone)]
pub struct QuestionStore {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionStore {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Add a question to the subject named by `subject` (full name or shorthand).
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::InvalidSubject` if the subject is unknown.
    /// Returns `QuestionStoreError::InvalidQuestion` if any text is blank.
    /// Returns `QuestionStoreError::Persistence` if the insert fails; nothing is stored then.
    pub async fn create(
        &self,
        subject: &str,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        wrong_answers: [String; WRONG_ANSWER_COUNT],
    ) -> Result<Question, QuestionStoreError> {
        let subject = Subject::normalize(subject)?;
        self.add(QuestionDraft::new(subject, text, correct_answer, wrong_answers))
            .await
    }

    /// Add an already-typed draft.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionStore::create`], minus subject resolution.
    pub async fn add(&self, draft: QuestionDraft) -> Result<Question, QuestionStoreError> {
        let validated = draft.validate()?;
        let question = self.questions.insert_question(validated).await?;
        tracing::info!(subject = %question.subject(), id = %question.id(), "question added");
        Ok(question)
    }

    /// Remove a question and renumber the rest of its subject.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::InvalidSubject` if the subject is unknown.
    /// Returns `QuestionStoreError::QuestionNotFound` if the id does not exist;
    /// the subject is left untouched.
    /// Returns `QuestionStoreError::Persistence` for storage failures.
    pub async fn delete(&self, subject: &str, id: QuestionId) -> Result<(), QuestionStoreError> {
        let subject = Subject::normalize(subject)?;
        match self.questions.delete_question(subject, id).await {
            Ok(()) => {
                tracing::info!(%subject, %id, "question removed");
                Ok(())
            }
            Err(StorageError::NotFound) => Err(QuestionStoreError::QuestionNotFound { subject, id }),
            Err(e) => Err(e.into()),
        }
    }

    /// Questions of one subject, or of every subject in catalog order when `None`.
    ///
    /// An empty subject yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::InvalidSubject` if the subject is unknown.
    /// Returns `QuestionStoreError::Persistence` for storage failures.
    pub async fn list(&self, subject: Option<&str>) -> Result<Vec<Question>, QuestionStoreError> {
        match subject {
            Some(raw) => self.list_subject(Subject::normalize(raw)?).await,
            None => Ok(self
                .list_grouped()
                .await?
                .into_iter()
                .flat_map(|(_, questions)| questions)
                .collect()),
        }
    }

    /// Questions of one subject, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::Persistence` for storage failures.
    pub async fn list_subject(&self, subject: Subject) -> Result<Vec<Question>, QuestionStoreError> {
        Ok(self.questions.list_questions(subject).await?)
    }

    /// Every subject in catalog order paired with its questions, empty ones included.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::Persistence` for storage failures.
    pub async fn list_grouped(&self) -> Result<Vec<(Subject, Vec<Question>)>, QuestionStoreError> {
        let mut grouped = Vec::with_capacity(Subject::ALL.len());
        for subject in Subject::ALL {
            grouped.push((subject, self.list_subject(subject).await?));
        }
        Ok(grouped)
    }

    /// Number of questions in a subject.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::Persistence` for storage failures.
    pub async fn count(&self, subject: Subject) -> Result<u32, QuestionStoreError> {
        Ok(self.questions.count_questions(subject).await?)
    }
}
