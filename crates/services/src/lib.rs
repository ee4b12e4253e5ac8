#![forbid(unsafe_code)]

pub mod error;
pub mod question_store;
pub mod quiz;

pub use quiz_core::Clock;

pub use error::{QuestionStoreError, QuizError};
pub use question_store::QuestionStore;
pub use quiz::{QuizPhase, QuizService, QuizState, ReviewEntry, Score, ShuffleSource};
