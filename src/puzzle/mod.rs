//! The triangle word puzzle: entities, rules and the engine that owns them.

mod contracts;
mod engine;
mod error;
pub mod invariants;
mod letter;
mod payload;
mod position;
mod types;
mod word;

pub use contracts::{Contract, FeedbackContract, FeedbackShape, GameInProgress};
pub use engine::PuzzleEngine;
pub use error::PuzzleError;
pub use letter::{LetterGroup, LetterTile};
pub use payload::{Feedback, Guess, LoadError, PuzzleData, NOT_SUBMITTED};
pub use position::Position;
pub use types::{
    Direction, GameStatus, GroupIndex, GuessScope, PositionIndex, Tier, TileId, DEFAULT_MAX_TURNS,
    POSITION_COUNT, WORD_COUNT, WORD_LENGTH,
};
pub use word::Word;
