//! Letter tiles and the groups that hand them out.

use super::types::{GroupIndex, PositionIndex, TileId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One physical, placeable instance of a letter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterTile {
    id: TileId,
    value: char,
    group: GroupIndex,
    position: Option<PositionIndex>,
    usable: bool,
}

impl LetterTile {
    pub(super) fn new(id: TileId, value: char, group: GroupIndex) -> Self {
        Self {
            id,
            value,
            group,
            position: None,
            usable: true,
        }
    }

    /// Id of this tile in the engine's pool.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Letter value (upper-case).
    pub fn value(&self) -> char {
        self.value
    }

    /// Letter group this tile belongs to.
    pub fn group(&self) -> GroupIndex {
        self.group
    }

    /// Position currently holding this tile, if any.
    pub fn position(&self) -> Option<PositionIndex> {
        self.position
    }

    /// Whether the tile is not on the board.
    pub fn is_unplaced(&self) -> bool {
        self.position.is_none()
    }

    /// False once the tile is committed to a confirmed position.
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub(super) fn set_position(&mut self, position: Option<PositionIndex>) {
        self.position = position;
    }

    pub(super) fn disable(&mut self) {
        self.usable = false;
    }
}

/// All tiles sharing one letter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterGroup {
    index: GroupIndex,
    value: char,
    tiles: Vec<TileId>,
}

impl LetterGroup {
    pub(super) fn new(index: GroupIndex, value: char) -> Self {
        Self {
            index,
            value,
            tiles: Vec::new(),
        }
    }

    /// Group index used to key feedback history.
    pub fn index(&self) -> GroupIndex {
        self.index
    }

    /// Letter value shared by every tile in the group.
    pub fn value(&self) -> char {
        self.value
    }

    /// Tile ids in creation order.
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub(super) fn push(&mut self, tile: TileId) {
        self.tiles.push(tile);
    }

    /// Picks the tile to hand out when the player asks for this letter.
    ///
    /// Unusable tiles are skipped. An unplaced tile wins over a placed one;
    /// with every usable tile already on the board the first usable tile is
    /// re-offered so the caller can move it. `None` means the letter is
    /// exhausted.
    #[instrument(skip(self, pool), fields(value = %self.value))]
    pub fn resolve(&self, pool: &[LetterTile]) -> Option<TileId> {
        let mut usable = self
            .tiles
            .iter()
            .filter_map(|id| pool.get(*id))
            .filter(|tile| tile.is_usable())
            .peekable();

        let first = usable.peek().map(|tile| tile.id())?;
        let chosen = usable
            .find(|tile| tile.is_unplaced())
            .map(|tile| tile.id())
            .unwrap_or(first);

        debug!(tile = chosen, "Resolved tile");
        Some(chosen)
    }

    /// Whether no tile of this group can be placed anymore.
    pub fn is_exhausted(&self, pool: &[LetterTile]) -> bool {
        self.resolve(pool).is_none()
    }
}
