mod ids;
mod question;
mod subject;

pub use ids::{ParseIdError, QuestionId};
pub use question::{
    Question, QuestionDraft, QuestionError, ValidatedQuestion, CHOICE_COUNT, WRONG_ANSWER_COUNT,
};
pub use subject::{Subject, SubjectError};
