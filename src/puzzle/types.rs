//! Core value types shared by the puzzle entities.

use serde::{Deserialize, Serialize};

/// Number of unique positions in the triangle.
pub const POSITION_COUNT: usize = 12;

/// Number of words in the triangle.
pub const WORD_COUNT: usize = 3;

/// Number of positions in a single word.
pub const WORD_LENGTH: usize = 5;

/// Turn budget used when no configuration says otherwise.
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Index of a position (0-11).
pub type PositionIndex = usize;

/// Index of a letter group, as assigned by the puzzle payload.
pub type GroupIndex = usize;

/// Index of a tile in the engine's tile pool.
pub type TileId = usize;

/// Feedback grade for one (position, letter group) pair.
///
/// Tier 0 is untried, tier 4 confirms the letter at that position.
/// Tiers 1-3 are ordered display categories whose meaning belongs to the
/// verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    /// Untried / neutral.
    pub const UNTRIED: Self = Self(0);

    /// Confirmed correct; locks the position.
    pub const CONFIRMED: Self = Self(4);

    /// Creates a tier from its raw value, rejecting anything above 4.
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::CONFIRMED.0).then_some(Self(value))
    }

    /// Raw tier value (0-4).
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this tier locks a position.
    pub fn is_confirmed(self) -> bool {
        self == Self::CONFIRMED
    }

    /// Whether any feedback has been recorded.
    pub fn is_untried(self) -> bool {
        self == Self::UNTRIED
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("Feedback tier {} is out of range 0-4", value))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a puzzle session. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display)]
pub enum GameStatus {
    /// Guesses are still being accepted.
    #[default]
    #[display("in progress")]
    InProgress,
    /// Turns ran out before the triangle was solved.
    #[display("lost")]
    Lost,
    /// Every position was confirmed.
    #[display("won")]
    Won,
}

impl GameStatus {
    /// Parses the wire status code (0 = in progress, 1 = lost, 2 = won).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::InProgress),
            1 => Some(Self::Lost),
            2 => Some(Self::Won),
            _ => None,
        }
    }

    /// Wire status code.
    pub fn code(self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Lost => 1,
            Self::Won => 2,
        }
    }

    /// Whether no further play is accepted.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Scan direction for focus and active-word movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards higher indices (right).
    Forward,
    /// Towards lower indices (left).
    Backward,
}

impl Direction {
    /// Steps `index` one place in this direction, wrapping within `len`.
    pub fn step(self, index: usize, len: usize) -> usize {
        match self {
            Self::Forward => (index + 1) % len,
            Self::Backward => (index + len - 1) % len,
        }
    }
}

/// Which words a guess covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuessScope {
    /// Only the active word.
    ActiveWord,
    /// All three words.
    AllWords,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_range() {
        assert_eq!(Tier::new(0), Some(Tier::UNTRIED));
        assert_eq!(Tier::new(4), Some(Tier::CONFIRMED));
        assert_eq!(Tier::new(5), None);
        assert!(Tier::try_from(9).is_err());
    }

    #[test]
    fn test_tier_serde_rejects_out_of_range() {
        let tiers: Vec<Tier> = serde_json::from_str("[0, 3, 4]").unwrap();
        assert_eq!(tiers[1].value(), 3);
        assert!(serde_json::from_str::<Vec<Tier>>("[7]").is_err());
    }

    #[test]
    fn test_status_codes() {
        for status in [GameStatus::InProgress, GameStatus::Lost, GameStatus::Won] {
            assert_eq!(GameStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(GameStatus::from_code(3), None);
        assert!(!GameStatus::InProgress.is_terminal());
        assert!(GameStatus::Won.is_terminal());
    }

    #[test]
    fn test_direction_wraps() {
        assert_eq!(Direction::Forward.step(4, 5), 0);
        assert_eq!(Direction::Backward.step(0, 5), 4);
        assert_eq!(Direction::Backward.step(0, 3), 2);
    }
}
