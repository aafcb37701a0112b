//! Words: ordered views over five positions with an input focus.

use super::letter::LetterTile;
use super::position::Position;
use super::types::{Direction, PositionIndex, POSITION_COUNT, WORD_LENGTH};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One side of the triangle.
///
/// The first and last entries are shared with the neighbouring words, so the
/// three words cover fifteen slots over twelve positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    index: usize,
    positions: [PositionIndex; WORD_LENGTH],
    active: bool,
    focus: usize,
}

impl Word {
    /// Builds word `index` of the triangle.
    ///
    /// Word `i` covers positions `4i..=4i+4`, wrapping back to position 0.
    pub(super) fn triangle_side(index: usize) -> Self {
        let start = (WORD_LENGTH - 1) * index;
        let positions = std::array::from_fn(|offset| (start + offset) % POSITION_COUNT);
        Self {
            index,
            positions,
            active: false,
            focus: 0,
        }
    }

    /// Word index (0-2).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position indices in reading order.
    pub fn positions(&self) -> &[PositionIndex; WORD_LENGTH] {
        &self.positions
    }

    /// Whether this word receives input.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Focused slot, as an index into [`Word::positions`].
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Position index under the focus.
    pub fn focused_position(&self) -> PositionIndex {
        self.positions[self.focus]
    }

    /// Concatenates the occupying letters in lower case, skipping empty slots.
    pub fn text(&self, slots: &[Position], pool: &[LetterTile]) -> String {
        self.positions
            .iter()
            .filter_map(|p| slots[*p].occupant())
            .map(|tile| pool[tile].value().to_ascii_lowercase())
            .collect()
    }

    /// Whether at least one slot holds a tile.
    pub fn has_letters(&self, slots: &[Position]) -> bool {
        self.positions.iter().any(|p| slots[*p].occupant().is_some())
    }

    /// Whether every slot is locked.
    pub fn is_solved(&self, slots: &[Position]) -> bool {
        self.positions.iter().all(|p| slots[*p].is_locked())
    }

    fn is_locked_at(&self, slots: &[Position], slot: usize) -> bool {
        slots[self.positions[slot]].is_locked()
    }

    /// Scans cyclically from `from` (exclusive) for a slot that is not locked.
    ///
    /// `from` itself is the last candidate. Returns `None` only when the whole
    /// word is locked.
    pub fn next_unlocked(&self, slots: &[Position], from: usize, direction: Direction) -> Option<usize> {
        let mut slot = from;
        for _ in 0..WORD_LENGTH {
            slot = direction.step(slot, WORD_LENGTH);
            if !self.is_locked_at(slots, slot) {
                return Some(slot);
            }
        }
        None
    }

    /// Sets the focus explicitly. Out-of-range or locked targets are ignored.
    #[instrument(skip(self, slots), fields(word = self.index))]
    pub fn set_focus(&mut self, slots: &[Position], slot: usize) -> bool {
        if slot >= WORD_LENGTH || self.is_locked_at(slots, slot) {
            debug!("Focus target rejected");
            return false;
        }
        self.focus = slot;
        true
    }

    /// Moves the focus to the next unlocked slot; stays put if there is none.
    pub fn shift_focus(&mut self, slots: &[Position], direction: Direction) {
        if let Some(next) = self.next_unlocked(slots, self.focus, direction) {
            self.focus = next;
        }
    }

    /// Moves the focus off a locked slot, if it sits on one.
    pub(super) fn refocus(&mut self, slots: &[Position]) {
        if self.is_locked_at(slots, self.focus) {
            self.shift_focus(slots, Direction::Forward);
        }
    }

    /// Puts the focus on the first unlocked slot.
    pub fn reset_focus(&mut self, slots: &[Position]) {
        if self.is_locked_at(slots, 0) {
            if let Some(start) = self.next_unlocked(slots, 0, Direction::Forward) {
                self.focus = start;
            }
        } else {
            self.focus = 0;
        }
    }

    /// Makes this the active word and resets its focus.
    pub fn activate(&mut self, slots: &[Position]) {
        self.active = true;
        self.reset_focus(slots);
    }

    /// Stops this word from receiving input.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
