//! Keyboard commands and their dispatch to a session.

use crate::backend::PuzzleBackend;
use crate::puzzle::{Direction, GameStatus, GuessScope, PuzzleError};
use crate::session::{PuzzleSession, SessionError};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, instrument};

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place a letter at the focus.
    Place(char),
    /// Clear the focused position.
    Clear,
    /// Clear every unlocked position.
    ClearAll,
    /// Submit for verification.
    Submit(GuessScope),
    /// Move the focus within the active word.
    Focus(Direction),
    /// Change the active word.
    ShiftWord(Direction),
}

/// Maps a key press to a command.
///
/// Keys held with Shift, Alt, Ctrl, Meta or Super do nothing, as do key
/// releases and repeats.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    let modified = KeyModifiers::SHIFT
        | KeyModifiers::ALT
        | KeyModifiers::CONTROL
        | KeyModifiers::META
        | KeyModifiers::SUPER;
    if key.kind != KeyEventKind::Press || key.modifiers.intersects(modified) {
        return None;
    }

    match key.code {
        KeyCode::Char(' ') => Some(Command::ShiftWord(Direction::Forward)),
        KeyCode::Char(c) if c.is_ascii_alphabetic() => Some(Command::Place(c)),
        KeyCode::Backspace => Some(Command::Clear),
        KeyCode::Delete => Some(Command::ClearAll),
        KeyCode::Enter => Some(Command::Submit(GuessScope::ActiveWord)),
        KeyCode::Tab => Some(Command::Submit(GuessScope::AllWords)),
        KeyCode::Left => Some(Command::Focus(Direction::Backward)),
        KeyCode::Right => Some(Command::Focus(Direction::Forward)),
        _ => None,
    }
}

/// Runs a command against the session and returns the resulting status.
///
/// Nothing reaches the engine once the game is over or while a guess is
/// being verified.
///
/// # Errors
///
/// Returns the session's rejection; [`SessionError::is_user_facing`] tells
/// whether it should be shown.
#[instrument(skip(session))]
pub async fn dispatch<B: PuzzleBackend>(
    session: &PuzzleSession<B>,
    command: Command,
) -> Result<GameStatus, SessionError> {
    let status = session.status().ok_or(SessionError::NotLoaded)?;
    if status.is_terminal() {
        debug!(%status, "Ignoring input on finished game");
        return Err(PuzzleError::GameOver.into());
    }
    if session.is_submitting() {
        return Err(SessionError::SubmitPending);
    }

    match command {
        Command::Place(letter) => session.place_letter(letter).map(drop)?,
        Command::Clear => session.clear_focused().map(drop)?,
        Command::ClearAll => session.clear_all().map(drop)?,
        Command::Focus(direction) => session.shift_focus(direction)?,
        Command::ShiftWord(direction) => session.shift_active_word(direction)?,
        Command::Submit(scope) => return session.submit(scope).await,
    }
    session.status().ok_or(SessionError::NotLoaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::puzzle::{Feedback, Guess, PuzzleData, Tier};
    use crate::stats::{Statistics, StatsSubject};
    use async_trait::async_trait;

    struct AlwaysConfirm;

    #[async_trait]
    impl PuzzleBackend for AlwaysConfirm {
        async fn load_puzzle(&self) -> Result<PuzzleData, BackendError> {
            Ok(PuzzleData::from_letters("abcdaefgahij"))
        }

        async fn submit_guess(&self, guess: &Guess) -> Result<Feedback, BackendError> {
            let mut words: [Option<Vec<Tier>>; 3] = Default::default();
            for (index, word) in words.iter_mut().enumerate() {
                if guess.word(index).is_some() {
                    *word = Some(vec![Tier::CONFIRMED; 5]);
                }
            }
            Ok(Feedback::new(words))
        }

        async fn statistics(&self, _subject: StatsSubject) -> Result<Statistics, BackendError> {
            Err(BackendError::new("unused"))
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(command_for(&press(KeyCode::Char('k'))), Some(Command::Place('k')));
        assert_eq!(
            command_for(&press(KeyCode::Char(' '))),
            Some(Command::ShiftWord(Direction::Forward))
        );
        assert_eq!(command_for(&press(KeyCode::Backspace)), Some(Command::Clear));
        assert_eq!(
            command_for(&press(KeyCode::Enter)),
            Some(Command::Submit(GuessScope::ActiveWord))
        );
        assert_eq!(
            command_for(&press(KeyCode::Left)),
            Some(Command::Focus(Direction::Backward))
        );
        assert_eq!(command_for(&press(KeyCode::Char('7'))), None);
    }

    #[test]
    fn test_modified_keys_ignored() {
        let shifted = KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT);
        let control = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&shifted), None);
        assert_eq!(command_for(&control), None);
    }

    #[tokio::test]
    async fn test_dispatch_requires_load() {
        let session = PuzzleSession::new(AlwaysConfirm, 10);
        assert_eq!(
            dispatch(&session, Command::Place('a')).await,
            Err(SessionError::NotLoaded)
        );
    }

    #[tokio::test]
    async fn test_dispatch_places_and_submits() {
        let session = PuzzleSession::new(AlwaysConfirm, 10);
        session.load().await.unwrap();

        for letter in ['a', 'b', 'c', 'd', 'a'] {
            dispatch(&session, Command::Place(letter)).await.unwrap();
        }
        let status = dispatch(&session, Command::Submit(GuessScope::ActiveWord))
            .await
            .unwrap();
        assert_eq!(status, GameStatus::InProgress);
        let engine = session.snapshot().unwrap();
        assert!(engine.positions()[..5].iter().all(|p| p.is_locked()));
        assert_eq!(engine.remaining_turns(), 9);
    }

    #[tokio::test]
    async fn test_dispatch_ignores_input_after_game_over() {
        let session = PuzzleSession::new(AlwaysConfirm, 10);
        session.load().await.unwrap();
        for letter in ['a', 'b', 'c', 'd', 'a'] {
            dispatch(&session, Command::Place(letter)).await.unwrap();
        }
        session.set_active_word(1).unwrap();
        session.focus_position(1, 1).unwrap();
        for letter in ['e', 'f', 'g', 'a'] {
            dispatch(&session, Command::Place(letter)).await.unwrap();
        }
        session.set_active_word(2).unwrap();
        session.focus_position(2, 1).unwrap();
        for letter in ['h', 'i', 'j'] {
            dispatch(&session, Command::Place(letter)).await.unwrap();
        }
        let status = dispatch(&session, Command::Submit(GuessScope::AllWords))
            .await
            .unwrap();
        assert_eq!(status, GameStatus::Won);

        let err = dispatch(&session, Command::ShiftWord(Direction::Forward))
            .await
            .unwrap_err();
        assert!(!err.is_user_facing());
    }
}
