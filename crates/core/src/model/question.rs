use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ids::QuestionId, subject::Subject};

/// Number of wrong answers every question carries.
pub const WRONG_ANSWER_COUNT: usize = 3;

/// Number of choices shown for a question (the correct one plus the wrong ones).
pub const CHOICE_COUNT: usize = WRONG_ANSWER_COUNT + 1;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated operator input for a new question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub subject: Subject,
    pub text: String,
    pub correct_answer: String,
    pub wrong_answers: [String; WRONG_ANSWER_COUNT],
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        subject: Subject,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        wrong_answers: [String; WRONG_ANSWER_COUNT],
    ) -> Self {
        Self {
            subject,
            text: text.into(),
            correct_answer: correct_answer.into(),
            wrong_answers,
        }
    }

    /// Check that every text field has visible content.
    ///
    /// Text is kept exactly as entered; only blankness is rejected. Whether a
    /// wrong answer repeats the correct one is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found, checking the question text,
    /// then the correct answer, then the wrong answers in order.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        if is_blank(&self.text) {
            return Err(QuestionError::EmptyText);
        }
        if is_blank(&self.correct_answer) {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        if let Some(index) = self.wrong_answers.iter().position(|a| is_blank(a)) {
            return Err(QuestionError::EmptyWrongAnswer { position: index + 1 });
        }

        Ok(ValidatedQuestion {
            subject: self.subject,
            text: self.text,
            correct_answer: self.correct_answer,
            wrong_answers: self.wrong_answers,
        })
    }
}

/// A question that passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    subject: Subject,
    text: String,
    correct_answer: String,
    wrong_answers: [String; WRONG_ANSWER_COUNT],
}

impl ValidatedQuestion {
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn wrong_answers(&self) -> &[String; WRONG_ANSWER_COUNT] {
        &self.wrong_answers
    }

    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            subject: self.subject,
            text: self.text,
            correct_answer: self.correct_answer,
            wrong_answers: self.wrong_answers,
        }
    }
}

/// A persisted multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    subject: Subject,
    text: String,
    correct_answer: String,
    wrong_answers: [String; WRONG_ANSWER_COUNT],
}

impl Question {
    /// Rehydrate a question read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the stored fields are blank.
    pub fn from_persisted(
        id: QuestionId,
        subject: Subject,
        text: String,
        correct_answer: String,
        wrong_answers: [String; WRONG_ANSWER_COUNT],
    ) -> Result<Self, QuestionError> {
        if id.value() == 0 {
            return Err(QuestionError::InvalidId);
        }
        QuestionDraft::new(subject, text, correct_answer, wrong_answers)
            .validate()
            .map(|validated| validated.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn wrong_answers(&self) -> &[String; WRONG_ANSWER_COUNT] {
        &self.wrong_answers
    }

    /// All choices, correct answer first.
    #[must_use]
    pub fn choices(&self) -> [&str; CHOICE_COUNT] {
        [
            self.correct_answer.as_str(),
            self.wrong_answers[0].as_str(),
            self.wrong_answers[1].as_str(),
            self.wrong_answers[2].as_str(),
        ]
    }

    /// Same content under a different id. Used when resequencing a subject.
    #[must_use]
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("wrong answer {position} cannot be empty")]
    EmptyWrongAnswer { position: usize },

    #[error("question id must be positive")]
    InvalidId,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
