//! Puzzle session: one engine plus its collaborators.
//!
//! The session owns the only asynchronous boundary. It enforces that at most
//! one guess is being verified at a time and that no player input reaches the
//! engine while one is.

use crate::backend::PuzzleBackend;
use crate::puzzle::{
    Direction, GameInProgress, GameStatus, GuessScope, PositionIndex, PuzzleEngine, PuzzleError,
    TileId,
};
use crate::stats::{Statistics, StatsSubject};
use derive_more::{Display, From};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Message shown when a puzzle cannot be loaded.
pub const LOAD_FAILURE: &str = "Puzzle could not be loaded. Please refresh the page to try again.";

/// Error returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum SessionError {
    /// The puzzle could not be fetched or built. Requires a reload.
    #[display("Puzzle could not be loaded. Please refresh the page to try again.")]
    LoadFailed {
        /// Underlying cause, for logs.
        reason: String,
    },

    /// The guess could not be verified. Nothing was applied.
    #[display("{}", _0)]
    SubmitFailed(String),

    /// Another guess is still being verified.
    #[display("A guess is already being checked.")]
    SubmitPending,

    /// No puzzle has been loaded yet.
    #[display("No puzzle is loaded.")]
    NotLoaded,

    /// The engine rejected the operation.
    #[from]
    #[display("{}", _0)]
    Puzzle(PuzzleError),

    /// Statistics could not be fetched.
    #[display("Game statistics could not be loaded. Please refresh the page and try again.")]
    Stats(String),
}

impl std::error::Error for SessionError {}

impl SessionError {
    /// Whether the player should see this error.
    pub fn is_user_facing(&self) -> bool {
        match self {
            Self::Puzzle(err) => err.is_user_facing(),
            Self::SubmitPending | Self::NotLoaded => false,
            _ => true,
        }
    }
}

/// Clears the in-flight flag however the submit ends.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A player's session against one backend.
///
/// Cheap to clone; clones share the same engine and in-flight state, so an
/// input loop and a pending submit can run on different tasks.
pub struct PuzzleSession<B> {
    backend: Arc<B>,
    max_turns: u32,
    engine: Arc<Mutex<Option<PuzzleEngine>>>,
    in_flight: Arc<AtomicBool>,
}

impl<B> Clone for PuzzleSession<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            max_turns: self.max_turns,
            engine: Arc::clone(&self.engine),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<B> std::fmt::Debug for PuzzleSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleSession")
            .field("max_turns", &self.max_turns)
            .field("in_flight", &self.in_flight.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<B: PuzzleBackend> PuzzleSession<B> {
    /// Creates a session with no puzzle loaded.
    #[instrument(skip(backend))]
    pub fn new(backend: B, max_turns: u32) -> Self {
        Self {
            backend: Arc::new(backend),
            max_turns,
            engine: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    fn engine(&self) -> MutexGuard<'_, Option<PuzzleEngine>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the puzzle and builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SubmitPending`] while a guess is being
    /// verified, leaving the current engine in place. Otherwise returns
    /// [`SessionError::LoadFailed`] without installing a new engine.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<GameStatus, SessionError> {
        if self.is_submitting() {
            warn!("Load rejected, a guess is pending");
            return Err(SessionError::SubmitPending);
        }
        let data = self.backend.load_puzzle().await.map_err(|e| {
            warn!(error = %e, "Puzzle load failed");
            SessionError::LoadFailed { reason: e.message }
        })?;
        let engine = PuzzleEngine::from_data(data, self.max_turns).map_err(|e| {
            warn!(error = %e, "Puzzle payload rejected");
            SessionError::LoadFailed { reason: e.message }
        })?;
        let status = engine.status();
        let mut guard = self.engine();
        // A submit may have started while the puzzle was fetched
        if self.is_submitting() {
            warn!("Load discarded, a guess is pending");
            return Err(SessionError::SubmitPending);
        }
        *guard = Some(engine);
        info!(%status, "Session loaded");
        Ok(status)
    }

    /// Discards the current engine and loads again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SubmitPending`] while a guess is being
    /// verified. Otherwise as [`PuzzleSession::load`]; the old engine is gone
    /// either way.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<GameStatus, SessionError> {
        if self.is_submitting() {
            return Err(SessionError::SubmitPending);
        }
        if let Some(mut engine) = self.engine().take() {
            engine.reset();
        }
        self.load().await
    }

    /// Whether an engine is loaded.
    pub fn is_loaded(&self) -> bool {
        self.engine().is_some()
    }

    /// Whether a guess is being verified.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Status of the loaded engine.
    pub fn status(&self) -> Option<GameStatus> {
        self.engine().as_ref().map(PuzzleEngine::status)
    }

    /// Whether placement and submission are currently possible.
    pub fn accepts_input(&self) -> bool {
        !self.is_submitting() && self.status() == Some(GameStatus::InProgress)
    }

    /// Runs `f` against the loaded engine, for rendering.
    pub fn with_engine<R>(&self, f: impl FnOnce(&PuzzleEngine) -> R) -> Option<R> {
        self.engine().as_ref().map(f)
    }

    /// Copy of the engine state.
    pub fn snapshot(&self) -> Option<PuzzleEngine> {
        self.engine().clone()
    }

    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut PuzzleEngine) -> Result<R, PuzzleError>,
    ) -> Result<R, SessionError> {
        let mut guard = self.engine();
        if self.is_submitting() {
            debug!("Input rejected while a guess is pending");
            return Err(SessionError::SubmitPending);
        }
        let engine = guard.as_mut().ok_or(SessionError::NotLoaded)?;
        Ok(f(engine)?)
    }

    /// See [`PuzzleEngine::place_letter`].
    pub fn place_letter(&self, letter: char) -> Result<PositionIndex, SessionError> {
        self.mutate(|engine| engine.place_letter(letter))
    }

    /// See [`PuzzleEngine::place_tile`].
    pub fn place_tile(&self, tile: TileId) -> Result<PositionIndex, SessionError> {
        self.mutate(|engine| engine.place_tile(tile))
    }

    /// See [`PuzzleEngine::clear_focused_position`].
    pub fn clear_focused(&self) -> Result<Option<TileId>, SessionError> {
        self.mutate(PuzzleEngine::clear_focused_position)
    }

    /// See [`PuzzleEngine::clear_all_letters`].
    pub fn clear_all(&self) -> Result<usize, SessionError> {
        self.mutate(PuzzleEngine::clear_all_letters)
    }

    /// See [`PuzzleEngine::shift_active_word`].
    pub fn shift_active_word(&self, direction: Direction) -> Result<(), SessionError> {
        self.mutate(|engine| {
            engine.shift_active_word(direction);
            Ok(())
        })
    }

    /// See [`PuzzleEngine::set_active_word`].
    pub fn set_active_word(&self, index: usize) -> Result<(), SessionError> {
        self.mutate(|engine| engine.set_active_word(index))
    }

    /// See [`PuzzleEngine::shift_focus`].
    pub fn shift_focus(&self, direction: Direction) -> Result<(), SessionError> {
        self.mutate(|engine| {
            engine.shift_focus(direction);
            Ok(())
        })
    }

    /// See [`PuzzleEngine::focus_position`].
    pub fn focus_position(&self, word: usize, slot: usize) -> Result<bool, SessionError> {
        self.mutate(|engine| engine.focus_position(word, slot))
    }

    /// Sends the active word or the whole puzzle for verification and applies
    /// the feedback.
    ///
    /// Input is refused until the response has been processed. A failed
    /// request consumes no turn and applies nothing.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SubmitPending`] if another submit has not finished
    /// - [`SessionError::SubmitFailed`] if the backend failed or refused
    /// - [`SessionError::Puzzle`] with [`PuzzleError::GameOver`] once finished
    #[instrument(skip(self))]
    pub async fn submit(&self, scope: GuessScope) -> Result<GameStatus, SessionError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            warn!("Submit rejected, another guess is pending");
            SessionError::SubmitPending
        })?;

        let guess = {
            let guard = self.engine();
            let engine = guard.as_ref().ok_or(SessionError::NotLoaded)?;
            GameInProgress::check(engine)?;
            engine.extract_guess(scope)
        };
        debug!(guess = ?guess.to_wire(), "Guess extracted");

        let feedback = self.backend.submit_guess(&guess).await.map_err(|e| {
            warn!(error = %e, "Verification failed");
            SessionError::SubmitFailed(e.message)
        })?;

        let mut guard = self.engine();
        let engine = guard.as_mut().ok_or(SessionError::NotLoaded)?;
        let status = engine.apply_feedback(&feedback)?;
        info!(%status, remaining_turns = engine.remaining_turns(), "Guess applied");
        Ok(status)
    }

    /// Fetches statistics. Has no effect on the engine.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stats`] if the backend fails.
    #[instrument(skip(self))]
    pub async fn statistics(&self, subject: StatsSubject) -> Result<Statistics, SessionError> {
        self.backend.statistics(subject).await.map_err(|e| {
            warn!(error = %e, "Statistics request failed");
            SessionError::Stats(e.message)
        })
    }
}
