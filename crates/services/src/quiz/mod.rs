mod service;
mod shuffle;
mod state;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use service::QuizService;
pub use shuffle::ShuffleSource;
pub use state::{
    CompletedQuiz, InProgressQuiz, QuizItem, QuizPhase, QuizProgress, QuizState, ReviewEntry,
    Score,
};
