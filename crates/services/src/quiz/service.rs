use quiz_core::Clock;
use quiz_core::model::Subject;

use crate::error::QuizError;
use crate::question_store::QuestionStore;

use super::shuffle::{ShuffleSource, Shuffler};
use super::state::{QuizPhase, QuizState, Score};

/// Drives `QuizState` transitions that need the question bank or the clock.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    store: QuestionStore,
    shuffle: Shuffler,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, store: QuestionStore) -> Self {
        Self {
            clock,
            store,
            shuffle: Shuffler::default(),
        }
    }

    /// Use `shuffle` for every quiz this service starts. A seed makes the whole
    /// sequence of quizzes reproducible.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: ShuffleSource) -> Self {
        self.shuffle = Shuffler::new(shuffle);
        self
    }

    #[must_use]
    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    /// Snapshot the subject's questions and start a quiz over them.
    ///
    /// Later edits to the bank do not affect a quiz that has started.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless `state` is selecting a subject.
    /// Returns `QuizError::EmptySubject` when the subject has no questions.
    /// Returns `QuizError::Store` if the questions cannot be loaded.
    /// On error `state` is unchanged.
    pub async fn start(&self, state: &mut QuizState, subject: Subject) -> Result<(), QuizError> {
        if state.phase() != QuizPhase::Selecting {
            return Err(QuizError::InvalidState {
                action: "start a quiz",
                state: state.phase(),
            });
        }

        let questions = self.store.list_subject(subject).await?;
        let total = questions.len();
        let started_at = self.clock.now();
        self.shuffle
            .with_rng(|rng| state.start(subject, questions, started_at, rng))?;

        tracing::info!(%subject, questions = total, "quiz started");
        Ok(())
    }

    /// Grade the quiz in progress.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless a quiz is in progress.
    pub fn submit(&self, state: &mut QuizState) -> Result<Score, QuizError> {
        let score = state.submit(self.clock.now())?;
        tracing::info!(correct = score.correct, total = score.total, "quiz submitted");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quiz_core::model::QuestionId;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service() -> QuizService {
        let store = QuestionStore::new(Arc::new(InMemoryRepository::new()));
        QuizService::new(Clock::fixed(fixed_now()), store).with_shuffle(ShuffleSource::Seeded(17))
    }

    async fn add(service: &QuizService, subject: &str, text: &str, correct: &str) {
        service
            .store()
            .create(
                subject,
                text,
                correct,
                ["w1".into(), "w2".into(), "w3".into()],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn started_quiz_is_a_snapshot_of_the_bank() {
        let service = service();
        add(&service, "Math", "first", "one").await;
        add(&service, "Math", "second", "two").await;

        let mut state = QuizState::default();
        service.start(&mut state, Subject::Math).await.unwrap();

        service.store().delete("Math", QuestionId::new(1)).await.unwrap();
        add(&service, "Math", "third", "three").await;

        let quiz = state.in_progress().unwrap();
        assert_eq!(quiz.items().len(), 2);
        assert_eq!(quiz.item(QuestionId::new(1)).unwrap().text(), "first");
        assert_eq!(quiz.item(QuestionId::new(2)).unwrap().text(), "second");
        assert_eq!(quiz.started_at(), fixed_now());

        state.record_answer(QuestionId::new(1), "one").unwrap();
        let score = service.submit(&mut state).unwrap();
        assert_eq!(score, Score { correct: 1, total: 2 });
    }

    #[tokio::test]
    async fn empty_subject_is_reported_and_state_kept() {
        let service = service();
        add(&service, "Math", "only math", "x").await;

        let mut state = QuizState::default();
        let err = service.start(&mut state, Subject::Science).await.unwrap_err();

        assert!(matches!(err, QuizError::EmptySubject(Subject::Science)));
        assert_eq!(state, QuizState::Selecting);
    }

    #[tokio::test]
    async fn start_requires_selecting_phase() {
        let service = service();
        add(&service, "g", "where", "here").await;

        let mut state = QuizState::default();
        service.start(&mut state, Subject::Geography).await.unwrap();
        let before = state.clone();

        let err = service.start(&mut state, Subject::Geography).await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidState { state: QuizPhase::InProgress, .. }
        ));
        assert_eq!(state, before);
    }

    async fn two_quizzes_in_a_row(service: &QuizService) -> (QuizState, QuizState) {
        let mut state = QuizState::default();
        service.start(&mut state, Subject::Math).await.unwrap();
        let first = state.clone();
        service.submit(&mut state).unwrap();
        state.reset().unwrap();
        service.start(&mut state, Subject::Math).await.unwrap();
        (first, state)
    }

    #[tokio::test]
    async fn seeded_service_varies_between_quizzes_but_replays_across_runs() {
        let service = service();
        for n in 1..=6 {
            add(&service, "Math", &format!("q{n}"), &format!("a{n}")).await;
        }
        let replay = QuizService::new(Clock::fixed(fixed_now()), service.store().clone())
            .with_shuffle(ShuffleSource::Seeded(17));

        let (first, second) = two_quizzes_in_a_row(&service).await;
        let (first_again, second_again) = two_quizzes_in_a_row(&replay).await;

        assert_ne!(first, second);
        assert_eq!(first, first_again);
        assert_eq!(second, second_again);
    }

    #[tokio::test]
    async fn submit_outside_a_quiz_is_invalid() {
        let service = service();
        let mut state = QuizState::default();
        assert!(matches!(
            service.submit(&mut state),
            Err(QuizError::InvalidState { state: QuizPhase::Selecting, .. })
        ));
    }
}
