use async_trait::async_trait;
use quiz_core::model::{Question, QuestionId, Subject, ValidatedQuestion};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the question bank.
///
/// Implementations keep every subject's ids equal to `1..=N` between calls.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question with id `max(subject) + 1` (or 1 for an empty subject).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored; nothing is inserted then.
    async fn insert_question(&self, question: ValidatedQuestion) -> Result<Question, StorageError>;

    /// Delete a question and shift every later id of the subject down by one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such question exists, leaving the
    /// subject untouched, or other storage errors.
    async fn delete_question(&self, subject: Subject, id: QuestionId) -> Result<(), StorageError>;

    /// All questions of a subject, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the questions cannot be read.
    async fn list_questions(&self, subject: Subject) -> Result<Vec<Question>, StorageError>;

    /// Number of questions in a subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the count cannot be read.
    async fn count_questions(&self, subject: Subject) -> Result<u32, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<Subject, Vec<Question>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(&self, question: ValidatedQuestion) -> Result<Question, StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let bucket = guard.entry(question.subject()).or_default();
        let id = bucket.last().map_or(QuestionId::FIRST, |q| q.id().next());
        let question = question.assign_id(id);
        bucket.push(question.clone());
        Ok(question)
    }

    async fn delete_question(&self, subject: Subject, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let bucket = guard.get_mut(&subject).ok_or(StorageError::NotFound)?;
        let index = bucket
            .iter()
            .position(|q| q.id() == id)
            .ok_or(StorageError::NotFound)?;

        bucket.remove(index);
        let tail = bucket.split_off(index);
        bucket.extend(tail.into_iter().map(|q| {
            let shifted = QuestionId::new(q.id().value() - 1);
            q.with_id(shifted)
        }));
        Ok(())
    }

    async fn list_questions(&self, subject: Subject) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&subject).cloned().unwrap_or_default())
    }

    async fn count_questions(&self, subject: Subject) -> Result<u32, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let len = guard.get(&subject).map_or(0, Vec::len);
        u32::try_from(len).map_err(|_| StorageError::Serialization("count overflow".into()))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let questions: Arc<dyn QuestionRepository> = Arc::new(InMemoryRepository::new());
        Self { questions }
    }
}
