//! Errors raised by the puzzle engine.

use super::types::{PositionIndex, TileId};

/// Error that can occur when a player action is validated or applied.
///
/// Apart from [`PuzzleError::InvariantViolation`], which is detected after a
/// change was made, none of these leave the engine in a different state than
/// before the call.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PuzzleError {
    /// Every tile of this letter has been committed to a confirmed position.
    #[display("The letter {} cannot be used anymore!", _0)]
    LetterExhausted(char),

    /// The letter is not part of this puzzle.
    #[display("The letter {} is not allowed!", _0)]
    InvalidLetter(char),

    /// The game has already been won or lost.
    #[display("The game has already ended.")]
    GameOver,

    /// The targeted position is locked.
    #[display("Position {} is locked", _0)]
    PositionLocked(PositionIndex),

    /// No word exists with this index.
    #[display("Word {} does not exist", _0)]
    InvalidWord(usize),

    /// No tile exists with this id.
    #[display("Tile {} does not exist", _0)]
    InvalidTile(TileId),

    /// Feedback from the verifier does not fit the puzzle.
    #[display("Malformed feedback: {}", _0)]
    MalformedFeedback(String),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for PuzzleError {}

impl PuzzleError {
    /// Whether the player should be told about this error.
    ///
    /// Operations rejected because the game is over are dropped silently;
    /// the surrounding controls are expected to be disabled already.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::GameOver | Self::InvariantViolation(_))
    }
}
