//! Tests for the puzzle session against an in-memory backend.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use word_trinity::{
    BackendError, Feedback, GameStatus, Guess, GuessScope, PuzzleBackend, PuzzleData,
    PuzzleError, PuzzleSession, SessionError, Statistics, StatsSubject, Tier, LOAD_FAILURE,
};

/// Backend double that replays scripted responses.
#[derive(Default)]
struct ScriptedBackend {
    puzzle: Mutex<Option<Result<PuzzleData, BackendError>>>,
    replies: Mutex<VecDeque<Result<Feedback, BackendError>>>,
    received: Arc<Mutex<Vec<Guess>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    fn new(data: PuzzleData) -> Self {
        Self {
            puzzle: Mutex::new(Some(Ok(data))),
            ..Self::default()
        }
    }

    fn reply(self, reply: Result<Feedback, BackendError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl PuzzleBackend for ScriptedBackend {
    async fn load_puzzle(&self) -> Result<PuzzleData, BackendError> {
        self.puzzle
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(BackendError::new("no puzzle scripted")))
    }

    async fn submit_guess(&self, guess: &Guess) -> Result<Feedback, BackendError> {
        self.received.lock().unwrap().push(guess.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::new("no reply scripted")))
    }

    async fn statistics(&self, _subject: StatsSubject) -> Result<Statistics, BackendError> {
        Ok(Statistics::new(vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0], 1, 100, 50, 2))
    }
}

fn data() -> PuzzleData {
    PuzzleData::from_letters("abcdaefgahij")
}

fn graded(tier: u8) -> Feedback {
    Feedback::for_word(0, vec![Tier::new(tier).unwrap(); 5])
}

#[tokio::test]
async fn test_input_before_load_is_rejected() {
    let session = PuzzleSession::new(ScriptedBackend::new(data()), 10);
    assert_eq!(session.place_letter('a'), Err(SessionError::NotLoaded));
    assert_eq!(
        session.submit(GuessScope::ActiveWord).await,
        Err(SessionError::NotLoaded)
    );
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn test_load_failure_reports_reload_message() {
    let backend = ScriptedBackend::default();
    *backend.puzzle.lock().unwrap() = Some(Err(BackendError::new("Try reloading the page.")));
    let session = PuzzleSession::new(backend, 10);

    let err = session.load().await.unwrap_err();
    assert_eq!(err.to_string(), LOAD_FAILURE);
    assert!(!session.is_loaded());
}

#[tokio::test]
async fn test_invalid_payload_fails_load() {
    let session = PuzzleSession::new(ScriptedBackend::new(PuzzleData::from_letters("abc")), 10);
    assert!(matches!(
        session.load().await,
        Err(SessionError::LoadFailed { .. })
    ));
    assert!(session.snapshot().is_none());
}

#[tokio::test]
async fn test_submit_applies_feedback() {
    let backend = ScriptedBackend::new(data()).reply(Ok(graded(2)));
    let received = Arc::clone(&backend.received);
    let session = PuzzleSession::new(backend, 10);
    session.load().await.unwrap();
    session.place_letter('a').unwrap();
    session.place_letter('b').unwrap();

    assert_eq!(
        session.submit(GuessScope::ActiveWord).await,
        Ok(GameStatus::InProgress)
    );
    let engine = session.snapshot().unwrap();
    assert_eq!(engine.remaining_turns(), 9);
    assert_eq!(engine.displayed_tier(1).value(), 2);
    assert_eq!(received.lock().unwrap()[0].word(0), Some("ab"));
    assert!(session.accepts_input());
}

#[tokio::test]
async fn test_failed_submit_consumes_no_turn() {
    let backend = ScriptedBackend::new(data())
        .reply(Err(BackendError::new("An invalid word was entered!")));
    let session = PuzzleSession::new(backend, 10);
    session.load().await.unwrap();
    session.place_letter('a').unwrap();
    let before = session.snapshot().unwrap();

    let err = session.submit(GuessScope::ActiveWord).await.unwrap_err();
    assert_eq!(err, SessionError::SubmitFailed("An invalid word was entered!".to_string()));
    assert!(err.is_user_facing());
    assert_eq!(session.snapshot().unwrap(), before);
    assert!(!session.is_submitting());
    assert!(session.place_letter('b').is_ok());
}

#[tokio::test]
async fn test_second_submit_is_rejected_while_pending() {
    let gate = Arc::new(Notify::new());
    let backend = ScriptedBackend::new(data())
        .reply(Ok(graded(1)))
        .gated(Arc::clone(&gate));
    let session = PuzzleSession::new(backend, 10);
    session.load().await.unwrap();
    session.place_letter('a').unwrap();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.submit(GuessScope::ActiveWord).await }
    });
    while !session.is_submitting() {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        session.submit(GuessScope::ActiveWord).await,
        Err(SessionError::SubmitPending)
    );
    assert_eq!(session.place_letter('b'), Err(SessionError::SubmitPending));
    assert_eq!(session.clear_all(), Err(SessionError::SubmitPending));
    assert!(!session.accepts_input());

    gate.notify_one();
    assert_eq!(pending.await.unwrap(), Ok(GameStatus::InProgress));
    assert!(!session.is_submitting());
    assert_eq!(session.snapshot().unwrap().remaining_turns(), 9);
    assert!(session.place_letter('b').is_ok());
}

#[tokio::test]
async fn test_load_is_rejected_while_submit_pending() {
    let gate = Arc::new(Notify::new());
    let backend = ScriptedBackend::new(data())
        .reply(Ok(graded(1)))
        .gated(Arc::clone(&gate));
    let session = PuzzleSession::new(backend, 10);
    session.load().await.unwrap();
    session.place_letter('a').unwrap();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.submit(GuessScope::ActiveWord).await }
    });
    while !session.is_submitting() {
        tokio::task::yield_now().await;
    }

    assert_eq!(session.load().await, Err(SessionError::SubmitPending));
    assert_eq!(session.reload().await, Err(SessionError::SubmitPending));

    gate.notify_one();
    assert_eq!(pending.await.unwrap(), Ok(GameStatus::InProgress));

    // The graded guess landed on the engine that produced it
    let engine = session.snapshot().unwrap();
    assert_eq!(engine.remaining_turns(), 9);
    assert_eq!(engine.letter_at(0), Some('A'));
    assert_eq!(engine.displayed_tier(0).value(), 1);
}

#[tokio::test]
async fn test_submit_after_loss_is_rejected() {
    let backend = ScriptedBackend::new(data()).reply(Ok(graded(1)));
    let session = PuzzleSession::new(backend, 1);
    session.load().await.unwrap();
    session.place_letter('a').unwrap();

    assert_eq!(session.submit(GuessScope::ActiveWord).await, Ok(GameStatus::Lost));
    assert_eq!(
        session.submit(GuessScope::ActiveWord).await,
        Err(SessionError::Puzzle(PuzzleError::GameOver))
    );
    assert!(!session.accepts_input());
}

#[tokio::test]
async fn test_reload_discards_progress() {
    let session = PuzzleSession::new(ScriptedBackend::new(data()), 10);
    session.load().await.unwrap();
    session.place_letter('a').unwrap();

    session.reload().await.unwrap();
    let engine = session.snapshot().unwrap();
    assert!(engine.tiles().iter().all(|t| t.is_unplaced()));
}

#[tokio::test]
async fn test_statistics_passthrough() {
    let session = PuzzleSession::new(ScriptedBackend::new(data()), 10);
    let stats = session.statistics(StatsSubject::User).await.unwrap();
    assert_eq!(*stats.win_rate(), 50);
    assert_eq!(stats.percentages()[1], 100.0);
}
