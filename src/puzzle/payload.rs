//! Plain data exchanged with the load and verification collaborators.

use super::types::{GameStatus, GroupIndex, Tier, POSITION_COUNT, WORD_COUNT};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// Placeholder sent for a word that is not part of a guess.
pub const NOT_SUBMITTED: &str = "None";

/// Everything needed to build or restore a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleData {
    /// Letter value of each tile (twelve tiles, values may repeat).
    pub letters: Vec<char>,
    /// Letter-group index of each tile, parallel to `letters`.
    pub groups: Vec<GroupIndex>,
    /// Per position, the tier of each letter group indexed by group.
    /// Empty when no feedback has been recorded yet.
    pub history: Vec<Vec<Tier>>,
    /// Per position, the letter left there by earlier guesses.
    /// Empty when nothing is placed.
    pub placements: Vec<Option<char>>,
    /// Turns already consumed.
    pub turns_used: u32,
    /// Status of the stored session.
    pub status: GameStatus,
}

impl PuzzleData {
    /// Creates data for a fresh session with the given tile pool.
    pub fn new(letters: Vec<char>, groups: Vec<GroupIndex>) -> Self {
        Self {
            letters,
            groups,
            history: Vec::new(),
            placements: Vec::new(),
            turns_used: 0,
            status: GameStatus::InProgress,
        }
    }

    /// Builds a fresh session from a string of tile letters, grouping equal
    /// letters in order of first appearance.
    pub fn from_letters(letters: &str) -> Self {
        let letters: Vec<char> = letters.chars().map(|c| c.to_ascii_uppercase()).collect();
        let mut seen: Vec<char> = Vec::new();
        let groups = letters
            .iter()
            .map(|letter| match seen.iter().position(|s| s == letter) {
                Some(group) => group,
                None => {
                    seen.push(*letter);
                    seen.len() - 1
                }
            })
            .collect();
        Self::new(letters, groups)
    }

    /// Sets the recorded feedback history.
    pub fn with_history(mut self, history: Vec<Vec<Tier>>) -> Self {
        self.history = history;
        self
    }

    /// Sets the letters restored onto the board.
    pub fn with_placements(mut self, placements: Vec<Option<char>>) -> Self {
        self.placements = placements;
        self
    }

    /// Sets the number of turns already consumed.
    pub fn with_turns_used(mut self, turns_used: u32) -> Self {
        self.turns_used = turns_used;
        self
    }

    /// Sets the stored status.
    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks the payload shape before anything is built from it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] describing the first problem found.
    #[instrument(skip(self))]
    pub fn validate(&self, max_turns: u32) -> Result<(), LoadError> {
        if self.letters.len() != POSITION_COUNT || self.groups.len() != POSITION_COUNT {
            return Err(LoadError::new(format!(
                "Expected {} letters and groups, got {} and {}",
                POSITION_COUNT,
                self.letters.len(),
                self.groups.len()
            )));
        }
        if let Some(bad) = self.letters.iter().find(|c| !c.is_ascii_alphabetic()) {
            return Err(LoadError::new(format!("Invalid letter '{}'", bad)));
        }

        let mut group_of: HashMap<char, GroupIndex> = HashMap::new();
        let mut letter_of: HashMap<GroupIndex, char> = HashMap::new();
        for (letter, group) in self.letters.iter().zip(&self.groups) {
            let letter = letter.to_ascii_uppercase();
            let known_group = *group_of.entry(letter).or_insert(*group);
            let known_letter = *letter_of.entry(*group).or_insert(letter);
            if known_group != *group || known_letter != letter {
                return Err(LoadError::new(format!(
                    "Letter '{}' and group {} are grouped inconsistently",
                    letter, group
                )));
            }
        }

        if !self.history.is_empty() && self.history.len() != POSITION_COUNT {
            return Err(LoadError::new(format!(
                "Expected history for {} positions, got {}",
                POSITION_COUNT,
                self.history.len()
            )));
        }

        if !self.placements.is_empty() {
            if self.placements.len() != POSITION_COUNT {
                return Err(LoadError::new(format!(
                    "Expected placements for {} positions, got {}",
                    POSITION_COUNT,
                    self.placements.len()
                )));
            }
            let mut available: HashMap<char, usize> = HashMap::new();
            for letter in &self.letters {
                *available.entry(letter.to_ascii_uppercase()).or_default() += 1;
            }
            for letter in self.placements.iter().flatten() {
                let count = available.entry(letter.to_ascii_uppercase()).or_default();
                if *count == 0 {
                    return Err(LoadError::new(format!("No tile left to restore '{}'", letter)));
                }
                *count -= 1;
            }
        }

        if self.turns_used > max_turns {
            return Err(LoadError::new(format!(
                "{} turns used exceeds the limit of {}",
                self.turns_used, max_turns
            )));
        }

        Ok(())
    }
}

/// Payload conversion or validation error.
#[derive(Debug, Clone, Display, Error)]
#[display("Load error: {} at {}:{}", message, file, line)]
pub struct LoadError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LoadError {
    /// Creates a new load error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Words extracted for verification; `None` marks a word not submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "[String; 3]")]
pub struct Guess {
    words: [Option<String>; WORD_COUNT],
}

impl Guess {
    /// Creates a guess from per-word strings.
    pub fn new(words: [Option<String>; WORD_COUNT]) -> Self {
        Self { words }
    }

    /// Submitted text of a word, if that word is part of the guess.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).and_then(|w| w.as_deref())
    }

    /// Wire form: three strings with [`NOT_SUBMITTED`] placeholders.
    pub fn to_wire(&self) -> [String; WORD_COUNT] {
        self.words
            .clone()
            .map(|w| w.unwrap_or_else(|| NOT_SUBMITTED.to_string()))
    }
}

impl From<Guess> for [String; WORD_COUNT] {
    fn from(guess: Guess) -> Self {
        guess.to_wire()
    }
}

/// Verifier response for one guess.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feedback {
    /// Per word, five tiers in reading order; `None` for words not graded.
    pub words: [Option<Vec<Tier>>; WORD_COUNT],
    /// Terminal status reported by the verifier, if any.
    pub status: Option<GameStatus>,
}

impl Feedback {
    /// Creates feedback from per-word tiers.
    pub fn new(words: [Option<Vec<Tier>>; WORD_COUNT]) -> Self {
        Self { words, status: None }
    }

    /// Feedback grading a single word.
    pub fn for_word(index: usize, tiers: Vec<Tier>) -> Self {
        let mut words: [Option<Vec<Tier>>; WORD_COUNT] = Default::default();
        if let Some(slot) = words.get_mut(index) {
            *slot = Some(tiers);
        }
        Self::new(words)
    }

    /// Feedback from raw tier values; values above 4 are rejected.
    pub fn from_raw(words: [Option<Vec<u8>>; WORD_COUNT]) -> Result<Self, String> {
        let mut converted: [Option<Vec<Tier>>; WORD_COUNT] = Default::default();
        for (slot, raw) in converted.iter_mut().zip(words) {
            if let Some(raw) = raw {
                *slot = Some(raw.into_iter().map(Tier::try_from).collect::<Result<_, _>>()?);
            }
        }
        Ok(Self::new(converted))
    }

    /// Attaches a verifier-reported status.
    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_letters_groups_by_first_appearance() {
        let data = PuzzleData::from_letters("abcdaefgahij");
        assert_eq!(data.letters[0], 'A');
        assert_eq!(data.groups, vec![0, 1, 2, 3, 0, 4, 5, 6, 0, 7, 8, 9]);
        assert!(data.validate(10).is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_groups() {
        let mut data = PuzzleData::from_letters("abcdaefgahij");
        data.groups[4] = 3;
        assert!(data.validate(10).is_err());
    }

    #[test]
    fn test_validate_rejects_short_pool() {
        let data = PuzzleData::from_letters("abc");
        let err = data.validate(10).unwrap_err();
        assert!(err.message.contains("Expected 12"));
    }

    #[test]
    fn test_validate_rejects_unrestorable_placement() {
        let mut placements = vec![None; POSITION_COUNT];
        placements[0] = Some('B');
        placements[1] = Some('B');
        let data = PuzzleData::from_letters("abcdaefgahij").with_placements(placements);
        assert!(data.validate(10).is_err());
    }

    #[test]
    fn test_validate_rejects_spent_turns() {
        let data = PuzzleData::from_letters("abcdaefgahij").with_turns_used(11);
        assert!(data.validate(10).is_err());
    }

    #[test]
    fn test_guess_wire_form() {
        let guess = Guess::new([None, Some("crane".to_string()), None]);
        assert_eq!(guess.to_wire(), ["None", "crane", "None"].map(String::from));
        assert_eq!(serde_json::to_string(&guess).unwrap(), r#"["None","crane","None"]"#);
        assert_eq!(guess.word(1), Some("crane"));
    }

    #[test]
    fn test_feedback_from_raw_rejects_bad_tier() {
        assert!(Feedback::from_raw([Some(vec![0, 1, 2, 3, 4]), None, None]).is_ok());
        assert!(Feedback::from_raw([Some(vec![0, 1, 9, 3, 4]), None, None]).is_err());
    }
}
