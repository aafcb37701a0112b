//! Placement sites and their feedback history.

use super::types::{GroupIndex, PositionIndex, Tier, TileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// One of the twelve unique placement sites.
///
/// A position remembers the latest tier of every letter group ever tried
/// on it, so the history survives tiles being moved around. Once locked, the
/// occupant and history are frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    index: PositionIndex,
    occupant: Option<TileId>,
    history: BTreeMap<GroupIndex, Tier>,
    locked: bool,
}

impl Position {
    pub(super) fn new(index: PositionIndex) -> Self {
        Self {
            index,
            occupant: None,
            history: BTreeMap::new(),
            locked: false,
        }
    }

    /// Position index (0-11).
    pub fn index(&self) -> PositionIndex {
        self.index
    }

    /// Tile currently placed here.
    pub fn occupant(&self) -> Option<TileId> {
        self.occupant
    }

    /// Whether the position has been confirmed and frozen.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Recorded tier for a letter group, untried if never graded.
    pub fn tier(&self, group: GroupIndex) -> Tier {
        self.history.get(&group).copied().unwrap_or_default()
    }

    /// Every graded letter group with its tier.
    pub fn history(&self) -> &BTreeMap<GroupIndex, Tier> {
        &self.history
    }

    /// Replaces the occupant, returning the previous one.
    ///
    /// Locked positions refuse and return `Err` with the current occupant.
    pub(super) fn set_occupant(&mut self, tile: Option<TileId>) -> Result<Option<TileId>, Option<TileId>> {
        if self.locked {
            return Err(self.occupant);
        }
        Ok(std::mem::replace(&mut self.occupant, tile))
    }

    /// Records feedback for a group. No-op once locked.
    #[instrument(skip(self), fields(position = self.index))]
    pub(super) fn record(&mut self, group: GroupIndex, tier: Tier) -> bool {
        if self.locked {
            debug!("Ignoring feedback for locked position");
            return false;
        }
        if tier.is_untried() {
            self.history.remove(&group);
        } else {
            self.history.insert(group, tier);
        }
        true
    }

    /// Freezes the position.
    pub(super) fn lock(&mut self) {
        self.locked = true;
    }

    /// Drops the occupant, history and lock.
    pub(super) fn clear(&mut self) {
        self.occupant = None;
        self.history.clear();
        self.locked = false;
    }
}
