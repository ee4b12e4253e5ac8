use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

use quiz_core::model::{Question, QuestionId, Subject};

use crate::error::QuizError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Where a quiz is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Selecting,
    InProgress,
    Completed,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuizPhase::Selecting => "selecting a subject",
            QuizPhase::InProgress => "in progress",
            QuizPhase::Completed => "completed",
        })
    }
}

//
// ─── ITEMS & RESULTS ───────────────────────────────────────────────────────────
//

/// One question as presented in a quiz, with its fixed choice order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    question: Question,
    choices: Vec<String>,
    grading_key: String,
    selected: Option<String>,
}

impl QuizItem {
    fn new<R: Rng + ?Sized>(question: Question, rng: &mut R) -> Self {
        let mut choices: Vec<String> = question
            .choices()
            .iter()
            .map(|c| (*c).to_owned())
            .collect();
        choices.shuffle(rng);
        let grading_key = question.correct_answer().to_owned();
        Self {
            question,
            choices,
            grading_key,
            selected: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.question.text()
    }

    /// The four choices in the order they are shown for this quiz.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.grading_key
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected.as_deref() == Some(self.grading_key.as_str())
    }
}

/// Number of correct answers out of the number of questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of {}", self.correct, self.total)
    }
}

/// Aggregated view of answering progress, useful for prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
}

/// One line of the post-quiz review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub question_id: QuestionId,
    pub question_text: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

//
// ─── QUIZ DATA PER PHASE ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InProgressQuiz {
    subject: Subject,
    items: Vec<QuizItem>,
    started_at: DateTime<Utc>,
}

impl InProgressQuiz {
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Items in presentation order.
    #[must_use]
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: QuestionId) -> Option<&QuizItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let answered = self.items.iter().filter(|i| i.selected.is_some()).count();
        QuizProgress {
            total: self.items.len(),
            answered,
            unanswered: self.items.len() - answered,
        }
    }

    fn score(&self) -> Score {
        Score {
            correct: self.items.iter().filter(|i| i.is_correct()).count(),
            total: self.items.len(),
        }
    }

    fn item_mut(&mut self, id: QuestionId) -> Result<&mut QuizItem, QuizError> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(QuizError::UnknownQuestion(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedQuiz {
    subject: Subject,
    items: Vec<QuizItem>,
    score: Score,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl CompletedQuiz {
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }

    #[must_use]
    pub fn review(&self) -> Vec<ReviewEntry> {
        self.items
            .iter()
            .map(|item| ReviewEntry {
                question_id: item.id(),
                question_text: item.text().to_owned(),
                selected: item.selected.clone(),
                correct_answer: item.grading_key.clone(),
                is_correct: item.is_correct(),
            })
            .collect()
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

/// A quiz session: `Selecting -> InProgress -> Completed -> Selecting`.
///
/// Every transition is a method; calling one from the wrong phase returns
/// `QuizError::InvalidState` and leaves the state as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QuizState {
    #[default]
    Selecting,
    InProgress(InProgressQuiz),
    Completed(CompletedQuiz),
}

impl QuizState {
    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self {
            Self::Selecting => QuizPhase::Selecting,
            Self::InProgress(_) => QuizPhase::InProgress,
            Self::Completed(_) => QuizPhase::Completed,
        }
    }

    #[must_use]
    pub fn in_progress(&self) -> Option<&InProgressQuiz> {
        match self {
            Self::InProgress(quiz) => Some(quiz),
            _ => None,
        }
    }

    #[must_use]
    pub fn completed(&self) -> Option<&CompletedQuiz> {
        match self {
            Self::Completed(quiz) => Some(quiz),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<QuizProgress> {
        self.in_progress().map(InProgressQuiz::progress)
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.completed().map(CompletedQuiz::score)
    }

    fn invalid(&self, action: &'static str) -> QuizError {
        QuizError::InvalidState {
            action,
            state: self.phase(),
        }
    }

    /// Begin a quiz over `questions`, shuffling their order and each one's choices.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless selecting a subject.
    /// Returns `QuizError::EmptySubject` if `questions` is empty; the state stays `Selecting`.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        subject: Subject,
        mut questions: Vec<Question>,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        if !matches!(self, Self::Selecting) {
            return Err(self.invalid("start a quiz"));
        }
        if questions.is_empty() {
            return Err(QuizError::EmptySubject(subject));
        }

        questions.shuffle(rng);
        let mut items = Vec::with_capacity(questions.len());
        for question in questions {
            items.push(QuizItem::new(question, rng));
        }

        *self = Self::InProgress(InProgressQuiz {
            subject,
            items,
            started_at,
        });
        Ok(())
    }

    /// Select `choice` for a question. The latest selection wins.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless in progress.
    /// Returns `QuizError::UnknownQuestion` or `QuizError::UnknownChoice` when the
    /// question is not in this quiz or the text is not one of its choices.
    pub fn record_answer(
        &mut self,
        id: QuestionId,
        choice: impl Into<String>,
    ) -> Result<(), QuizError> {
        let phase = self.phase();
        let Self::InProgress(quiz) = self else {
            return Err(QuizError::InvalidState {
                action: "record an answer",
                state: phase,
            });
        };

        let choice = choice.into();
        let item = quiz.item_mut(id)?;
        if !item.choices.contains(&choice) {
            return Err(QuizError::UnknownChoice {
                question: id,
                choice,
            });
        }
        item.selected = Some(choice);
        Ok(())
    }

    /// Put a question back to unanswered.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless in progress, or
    /// `QuizError::UnknownQuestion` if the question is not in this quiz.
    pub fn clear_answer(&mut self, id: QuestionId) -> Result<(), QuizError> {
        let phase = self.phase();
        let Self::InProgress(quiz) = self else {
            return Err(QuizError::InvalidState {
                action: "clear an answer",
                state: phase,
            });
        };
        quiz.item_mut(id)?.selected = None;
        Ok(())
    }

    /// Grade the quiz and move to `Completed`. Unanswered questions count as wrong.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless in progress.
    pub fn submit(&mut self, completed_at: DateTime<Utc>) -> Result<Score, QuizError> {
        match std::mem::take(self) {
            Self::InProgress(quiz) => {
                let score = quiz.score();
                *self = Self::Completed(CompletedQuiz {
                    subject: quiz.subject,
                    items: quiz.items,
                    score,
                    started_at: quiz.started_at,
                    completed_at,
                });
                Ok(score)
            }
            other => {
                *self = other;
                Err(self.invalid("submit"))
            }
        }
    }

    /// Per-question outcome, in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless completed.
    pub fn review(&self) -> Result<Vec<ReviewEntry>, QuizError> {
        self.completed()
            .map(CompletedQuiz::review)
            .ok_or_else(|| self.invalid("review"))
    }

    /// Discard a finished quiz and go back to subject selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless completed.
    pub fn reset(&mut self) -> Result<(), QuizError> {
        if !matches!(self, Self::Completed(_)) {
            return Err(self.invalid("choose another quiz"));
        }
        *self = Self::Selecting;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: u32, correct: &str) -> Question {
        Question::from_persisted(
            QuestionId::new(id),
            Subject::Math,
            format!("Question {id}"),
            correct.to_string(),
            [
                format!("{correct} wrong a"),
                format!("{correct} wrong b"),
                format!("{correct} wrong c"),
            ],
        )
        .unwrap()
    }

    fn questions(n: u32) -> Vec<Question> {
        (1..=n).map(|id| question(id, &format!("answer {id}"))).collect()
    }

    fn started(qs: Vec<Question>, seed: u64) -> QuizState {
        let mut state = QuizState::default();
        state
            .start(
                Subject::Math,
                qs,
                fixed_now(),
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
        state
    }

    fn correct_of(state: &QuizState, id: u32) -> String {
        state
            .in_progress()
            .and_then(|q| q.item(QuestionId::new(id)))
            .map(|item| item.correct_answer().to_owned())
            .unwrap()
    }

    fn wrong_of(state: &QuizState, id: u32) -> String {
        let item = state
            .in_progress()
            .and_then(|q| q.item(QuestionId::new(id)))
            .unwrap();
        item.choices()
            .iter()
            .find(|c| c.as_str() != item.correct_answer())
            .cloned()
            .unwrap()
    }

    #[test]
    fn start_on_empty_subject_stays_selecting() {
        let mut state = QuizState::default();
        let err = state
            .start(
                Subject::History,
                Vec::new(),
                fixed_now(),
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap_err();

        assert!(matches!(err, QuizError::EmptySubject(Subject::History)));
        assert_eq!(state.phase(), QuizPhase::Selecting);
    }

    #[test]
    fn start_keeps_every_question_and_permutes_choices() {
        let qs = questions(6);
        let state = started(qs.clone(), 42);
        let quiz = state.in_progress().unwrap();

        assert_eq!(quiz.items().len(), 6);
        let mut ids: Vec<u32> = quiz.items().iter().map(|i| i.id().value()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        for item in quiz.items() {
            let source = qs.iter().find(|q| q.id() == item.id()).unwrap();
            let mut shown: Vec<&str> = item.choices().iter().map(String::as_str).collect();
            let mut expected = source.choices().to_vec();
            shown.sort_unstable();
            expected.sort_unstable();
            assert_eq!(shown, expected);
            assert_eq!(item.selected(), None);
            assert_eq!(item.correct_answer(), source.correct_answer());
        }
    }

    #[test]
    fn same_seed_gives_same_presentation() {
        let a = started(questions(8), 99);
        let b = started(questions(8), 99);
        assert_eq!(a, b);
    }

    #[test]
    fn one_correct_one_unanswered_scores_one_of_two() {
        let mut state = started(questions(2), 3);
        let answer = correct_of(&state, 1);
        state.record_answer(QuestionId::new(1), answer).unwrap();

        let score = state.submit(fixed_now()).unwrap();

        assert_eq!(score, Score { correct: 1, total: 2 });
        assert_eq!(state.phase(), QuizPhase::Completed);
        assert_eq!(state.score(), Some(score));
    }

    #[test]
    fn unanswered_quiz_scores_zero() {
        let mut state = started(questions(3), 5);
        let score = state.submit(fixed_now()).unwrap();
        assert_eq!(score, Score { correct: 0, total: 3 });
    }

    #[test]
    fn last_answer_wins() {
        let mut state = started(questions(1), 11);
        let id = QuestionId::new(1);
        let right = correct_of(&state, 1);
        let wrong = wrong_of(&state, 1);

        state.record_answer(id, right.clone()).unwrap();
        state.record_answer(id, wrong).unwrap();
        let mut again = state.clone();
        assert_eq!(state.submit(fixed_now()).unwrap().correct, 0);

        again.record_answer(id, right).unwrap();
        assert_eq!(again.submit(fixed_now()).unwrap().correct, 1);
    }

    #[test]
    fn clear_answer_makes_question_unanswered() {
        let mut state = started(questions(2), 8);
        let id = QuestionId::new(2);
        state.record_answer(id, correct_of(&state, 2)).unwrap();
        assert_eq!(state.progress().unwrap().answered, 1);

        state.clear_answer(id).unwrap();

        let progress = state.progress().unwrap();
        assert_eq!(progress.answered, 0);
        assert_eq!(progress.unanswered, 2);
        assert_eq!(state.submit(fixed_now()).unwrap().correct, 0);
    }

    #[test]
    fn unknown_question_or_choice_is_rejected_without_change() {
        let mut state = started(questions(2), 2);
        let before = state.clone();

        let err = state
            .record_answer(QuestionId::new(3), "anything")
            .unwrap_err();
        assert!(matches!(err, QuizError::UnknownQuestion(id) if id == QuestionId::new(3)));

        let err = state
            .record_answer(QuestionId::new(1), "not offered")
            .unwrap_err();
        assert!(matches!(err, QuizError::UnknownChoice { ref choice, .. } if choice == "not offered"));

        assert_eq!(state, before);
    }

    #[test]
    fn answer_text_none_is_an_ordinary_answer() {
        let mut state = QuizState::default();
        state
            .start(
                Subject::English,
                vec![question(1, "None"), question(2, "None")],
                fixed_now(),
                &mut StdRng::seed_from_u64(4),
            )
            .unwrap();

        state.record_answer(QuestionId::new(1), "None").unwrap();

        assert_eq!(state.submit(fixed_now()).unwrap().correct, 1);
    }

    #[test]
    fn operations_in_wrong_phase_are_invalid() {
        let mut state = QuizState::default();
        assert!(matches!(
            state.record_answer(QuestionId::new(1), "x"),
            Err(QuizError::InvalidState { state: QuizPhase::Selecting, .. })
        ));
        assert!(matches!(
            state.submit(fixed_now()),
            Err(QuizError::InvalidState { state: QuizPhase::Selecting, .. })
        ));
        assert!(state.review().is_err());
        assert!(state.reset().is_err());
        assert_eq!(state.phase(), QuizPhase::Selecting);

        let mut state = started(questions(1), 1);
        let before = state.clone();
        assert!(matches!(
            state.start(Subject::Math, questions(1), fixed_now(), &mut StdRng::seed_from_u64(1)),
            Err(QuizError::InvalidState { state: QuizPhase::InProgress, .. })
        ));
        assert!(state.review().is_err());
        assert!(state.reset().is_err());
        assert_eq!(state, before);

        state.submit(fixed_now()).unwrap();
        let before = state.clone();
        assert!(matches!(
            state.submit(fixed_now()),
            Err(QuizError::InvalidState { state: QuizPhase::Completed, .. })
        ));
        assert!(state.record_answer(QuestionId::new(1), "x").is_err());
        assert!(
            state
                .start(Subject::Math, questions(1), fixed_now(), &mut StdRng::seed_from_u64(1))
                .is_err()
        );
        assert_eq!(state, before);
    }

    #[test]
    fn review_lists_outcomes_in_presentation_order() {
        let mut state = started(questions(3), 21);
        let order: Vec<QuestionId> = state
            .in_progress()
            .unwrap()
            .items()
            .iter()
            .map(QuizItem::id)
            .collect();
        let first = order[0];
        let second = order[1];
        state
            .record_answer(first, correct_of(&state, first.value()))
            .unwrap();
        state
            .record_answer(second, wrong_of(&state, second.value()))
            .unwrap();
        state.submit(fixed_now()).unwrap();

        let review = state.review().unwrap();
        let ids: Vec<QuestionId> = review.iter().map(|e| e.question_id).collect();
        assert_eq!(ids, order);

        assert!(review[0].is_correct);
        assert_eq!(review[0].selected.as_deref(), Some(review[0].correct_answer.as_str()));
        assert!(!review[1].is_correct);
        assert!(review[1].selected.is_some());
        assert!(!review[2].is_correct);
        assert_eq!(review[2].selected, None);
        assert_eq!(review[2].question_text, format!("Question {}", order[2]));
    }

    #[test]
    fn reset_returns_to_selecting_and_allows_a_new_quiz() {
        let mut state = started(questions(2), 6);
        state.submit(fixed_now()).unwrap();

        state.reset().unwrap();
        assert_eq!(state, QuizState::Selecting);

        state
            .start(
                Subject::Math,
                questions(1),
                fixed_now(),
                &mut StdRng::seed_from_u64(6),
            )
            .unwrap();
        assert_eq!(state.phase(), QuizPhase::InProgress);
    }

    #[test]
    fn score_matches_number_of_matching_answers() {
        for seed in 0..20_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = QuizState::default();
            state
                .start(Subject::Math, questions(5), fixed_now(), &mut rng)
                .unwrap();

            let items: Vec<QuizItem> = state.in_progress().unwrap().items().to_vec();
            let mut expected = 0;
            for (n, item) in items.iter().enumerate() {
                // Leave every third question unanswered.
                if n % 3 == 2 {
                    continue;
                }
                let pick = &item.choices()[rng.random_range(0..item.choices().len())];
                if pick == item.correct_answer() {
                    expected += 1;
                }
                state.record_answer(item.id(), pick.clone()).unwrap();
            }

            let score = state.submit(fixed_now()).unwrap();
            assert_eq!(score.total, 5);
            assert!(score.correct <= score.total);
            assert_eq!(score.correct, expected, "seed {seed}");
        }
    }

    #[test]
    fn duration_is_measured_from_start_to_submit() {
        let mut state = started(questions(1), 1);
        let later = fixed_now() + Duration::seconds(90);
        state.submit(later).unwrap();
        assert_eq!(state.completed().unwrap().duration(), Duration::seconds(90));
    }
}
