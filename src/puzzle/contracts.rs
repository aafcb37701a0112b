//! Contract-based validation for feedback application.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} apply_feedback {Q}

use super::error::PuzzleError;
use super::invariants::{InvariantSet, PuzzleInvariants};
use super::payload::Feedback;
use super::types::WORD_LENGTH;
use super::PuzzleEngine;
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), PuzzleError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), PuzzleError>;
}

/// Precondition: the game must still be in progress.
pub struct GameInProgress;

impl GameInProgress {
    /// Rejects any operation on a finished game.
    pub fn check(engine: &PuzzleEngine) -> Result<(), PuzzleError> {
        if engine.status().is_terminal() {
            warn!(status = %engine.status(), "Operation rejected on finished game");
            Err(PuzzleError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: each graded word carries exactly one tier per slot.
pub struct FeedbackShape;

impl FeedbackShape {
    /// Validates the per-word tier arrays.
    pub fn check(feedback: &Feedback) -> Result<(), PuzzleError> {
        for (word, tiers) in feedback.words.iter().enumerate() {
            if let Some(tiers) = tiers
                && tiers.len() != WORD_LENGTH
            {
                return Err(PuzzleError::MalformedFeedback(format!(
                    "word {} has {} tiers, expected {}",
                    word,
                    tiers.len(),
                    WORD_LENGTH
                )));
            }
        }
        Ok(())
    }
}

/// Contract for applying verifier feedback.
///
/// Preconditions:
/// - Game is in progress
/// - Feedback has five tiers per graded word
///
/// Postconditions:
/// - Exactly one turn was consumed
/// - Positions locked before are untouched
/// - Engine invariants hold
pub struct FeedbackContract;

impl Contract<PuzzleEngine, Feedback> for FeedbackContract {
    fn pre(engine: &PuzzleEngine, feedback: &Feedback) -> Result<(), PuzzleError> {
        GameInProgress::check(engine)?;
        FeedbackShape::check(feedback)
    }

    fn post(before: &PuzzleEngine, after: &PuzzleEngine) -> Result<(), PuzzleError> {
        if after.remaining_turns() + 1 != before.remaining_turns() {
            return Err(PuzzleError::InvariantViolation(format!(
                "Postcondition failed: turns went from {} to {}",
                before.remaining_turns(),
                after.remaining_turns()
            )));
        }

        let locks_frozen = before
            .positions()
            .iter()
            .zip(after.positions())
            .filter(|(old, _)| old.is_locked())
            .all(|(old, new)| old == new);
        if !locks_frozen {
            return Err(PuzzleError::InvariantViolation(
                "Postcondition failed: a locked position changed".to_string(),
            ));
        }

        PuzzleInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            PuzzleError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

/// Asserts that all engine invariants hold (panic on violation in debug builds).
#[instrument(skip(engine))]
pub fn assert_invariants(engine: &PuzzleEngine) {
    debug_assert!(
        PuzzleInvariants::check_all(engine).is_ok(),
        "Puzzle invariants violated: {:?}",
        PuzzleInvariants::check_all(engine).err()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{PuzzleData, Tier};

    fn engine() -> PuzzleEngine {
        PuzzleEngine::from_data(PuzzleData::from_letters("abcdefghijkl"), 10).unwrap()
    }

    #[test]
    fn test_precondition_rejects_short_word() {
        let feedback = Feedback::for_word(1, vec![Tier::UNTRIED; 4]);
        assert!(matches!(
            FeedbackContract::pre(&engine(), &feedback),
            Err(PuzzleError::MalformedFeedback(_))
        ));
    }

    #[test]
    fn test_precondition_rejects_finished_game() {
        let mut engine = engine();
        engine.status = crate::puzzle::GameStatus::Lost;
        let feedback = Feedback::for_word(0, vec![Tier::UNTRIED; 5]);
        assert_eq!(FeedbackContract::pre(&engine, &feedback), Err(PuzzleError::GameOver));
    }

    #[test]
    fn test_postcondition_holds_after_feedback() {
        let mut engine = engine();
        engine.place_letter('a').unwrap();
        let before = engine.clone();
        engine
            .apply_feedback(&Feedback::for_word(0, vec![Tier::CONFIRMED, Tier::UNTRIED, Tier::UNTRIED, Tier::UNTRIED, Tier::UNTRIED]))
            .unwrap();
        assert!(FeedbackContract::post(&before, &engine).is_ok());
    }

    #[test]
    fn test_postcondition_detects_missing_turn() {
        let engine = engine();
        assert!(FeedbackContract::post(&engine, &engine.clone()).is_err());
    }
}
