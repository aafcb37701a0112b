//! Turn budget: turns stay within bounds and one word is active.

use super::super::PuzzleEngine;
use super::Invariant;

/// Invariant: remaining turns never exceed the configured maximum, and
/// exactly one word (the recorded active word) is active.
pub struct TurnBudgetInvariant;

impl Invariant<PuzzleEngine> for TurnBudgetInvariant {
    fn holds(engine: &PuzzleEngine) -> bool {
        let within_budget = engine.remaining_turns() <= engine.max_turns();
        let active: Vec<_> = engine.words().iter().filter(|w| w.is_active()).collect();
        let single_active = active.len() == 1 && active[0].index() == engine.active_word_index();
        within_budget && single_active
    }

    fn description() -> &'static str {
        "Remaining turns stay within the budget and exactly one word is active"
    }
}
