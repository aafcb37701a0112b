//! Single occupancy: tiles and positions agree on who holds what.

use super::super::PuzzleEngine;
use super::Invariant;

/// Invariant: a tile occupies at most one position, and the tile's recorded
/// position matches the position's recorded occupant.
pub struct SingleOccupancyInvariant;

impl Invariant<PuzzleEngine> for SingleOccupancyInvariant {
    fn holds(engine: &PuzzleEngine) -> bool {
        let tiles = engine.tiles();
        let positions = engine.positions();

        let positions_agree = positions.iter().all(|position| match position.occupant() {
            Some(tile) => tiles
                .get(tile)
                .is_some_and(|t| t.position() == Some(position.index())),
            None => true,
        });

        let tiles_agree = tiles.iter().all(|tile| match tile.position() {
            Some(index) => positions
                .get(index)
                .is_some_and(|p| p.occupant() == Some(tile.id())),
            None => true,
        });

        positions_agree && tiles_agree
    }

    fn description() -> &'static str {
        "Each tile occupies at most one position and back-references agree"
    }
}
