//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, QuestionId, Subject, SubjectError};
use storage::repository::StorageError;

use crate::quiz::QuizPhase;

/// Errors emitted by `QuestionStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionStoreError {
    #[error(transparent)]
    InvalidSubject(#[from] SubjectError),
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
    #[error("no question found with ID {id} in {subject}")]
    QuestionNotFound { subject: Subject, id: QuestionId },
    #[error("storage failure: {0}")]
    Persistence(#[from] StorageError),
}

impl QuestionStoreError {
    /// True when the failure came from the storage backend rather than the request.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for {0}")]
    EmptySubject(Subject),
    #[error("cannot {action} while the quiz is {state}")]
    InvalidState {
        action: &'static str,
        state: QuizPhase,
    },
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("{choice:?} is not a choice for question {question}")]
    UnknownChoice { question: QuestionId, choice: String },
    #[error(transparent)]
    Store(#[from] QuestionStoreError),
}

impl QuizError {
    /// True when the failure came from the storage backend rather than the session.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_persistence())
    }
}
