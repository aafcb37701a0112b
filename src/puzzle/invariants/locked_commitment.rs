//! Locked commitment: a lock always pins a confirmed, retired tile.

use super::super::PuzzleEngine;
use super::Invariant;

/// Invariant: every locked position holds a tile, that tile is unusable, and
/// the position's history confirms the tile's letter group. Conversely every
/// unusable tile sits on a locked position.
pub struct LockedCommitmentInvariant;

impl Invariant<PuzzleEngine> for LockedCommitmentInvariant {
    fn holds(engine: &PuzzleEngine) -> bool {
        let tiles = engine.tiles();
        let positions = engine.positions();

        let locks_committed = positions.iter().filter(|p| p.is_locked()).all(|position| {
            position
                .occupant()
                .and_then(|id| tiles.get(id))
                .is_some_and(|tile| !tile.is_usable() && position.tier(tile.group()).is_confirmed())
        });

        let retired_tiles_locked = tiles.iter().filter(|t| !t.is_usable()).all(|tile| {
            tile.position()
                .and_then(|index| positions.get(index))
                .is_some_and(|position| position.is_locked())
        });

        locks_committed && retired_tiles_locked
    }

    fn description() -> &'static str {
        "Locked positions hold a confirmed, unusable tile"
    }
}
