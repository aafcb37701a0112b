//! The puzzle engine: owns every entity and exposes the player operations.

use super::contracts::{assert_invariants, Contract, FeedbackContract, GameInProgress};
use super::error::PuzzleError;
use super::letter::{LetterGroup, LetterTile};
use super::payload::{Feedback, Guess, LoadError, PuzzleData};
use super::position::Position;
use super::types::{
    Direction, GameStatus, GroupIndex, GuessScope, PositionIndex, Tier, TileId, POSITION_COUNT,
    WORD_COUNT,
};
use super::word::Word;
use tracing::{debug, info, instrument, warn};

/// Renderer-independent state machine for one puzzle session.
///
/// Every operation is synchronous. Display layers read the snapshot
/// accessors after each call; the engine holds no references to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleEngine {
    pub(crate) max_turns: u32,
    pub(crate) tiles: Vec<LetterTile>,
    pub(crate) groups: Vec<LetterGroup>,
    pub(crate) positions: Vec<Position>,
    pub(crate) words: Vec<Word>,
    pub(crate) active: usize,
    pub(crate) remaining_turns: u32,
    pub(crate) status: GameStatus,
}

// ─────────────────────────────────────────────────────────────
//  Construction and loading
// ─────────────────────────────────────────────────────────────

impl PuzzleEngine {
    /// Creates an empty engine with the triangle laid out and no tiles.
    #[instrument]
    pub fn new(max_turns: u32) -> Self {
        let positions: Vec<Position> = (0..POSITION_COUNT).map(Position::new).collect();
        let mut words: Vec<Word> = (0..WORD_COUNT).map(Word::triangle_side).collect();
        words[0].activate(&positions);
        Self {
            max_turns,
            tiles: Vec::new(),
            groups: Vec::new(),
            positions,
            words,
            active: 0,
            remaining_turns: max_turns,
            status: GameStatus::InProgress,
        }
    }

    /// Creates an engine and loads `data` into it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the payload does not describe a puzzle.
    pub fn from_data(data: PuzzleData, max_turns: u32) -> Result<Self, LoadError> {
        let mut engine = Self::new(max_turns);
        engine.load(&data)?;
        Ok(engine)
    }

    /// Clears all session state while keeping the twelve positions.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!("Resetting engine");
        self.positions.iter_mut().for_each(Position::clear);
        self.tiles.clear();
        self.groups.clear();
        self.words = (0..WORD_COUNT).map(Word::triangle_side).collect();
        self.active = 0;
        self.words[0].activate(&self.positions);
        self.remaining_turns = self.max_turns;
        self.status = GameStatus::InProgress;
    }

    /// Rebuilds tiles, groups, history and placements from a payload.
    ///
    /// Restored letters whose history is already confirmed are locked again,
    /// so a finished session comes back with its locks in place. The payload
    /// is validated first and nothing changes if it is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the payload is malformed.
    #[instrument(skip(self, data), fields(turns_used = data.turns_used, status = %data.status))]
    pub fn load(&mut self, data: &PuzzleData) -> Result<(), LoadError> {
        data.validate(self.max_turns)?;
        self.reset();

        for (id, (letter, group)) in data.letters.iter().zip(&data.groups).enumerate() {
            let value = letter.to_ascii_uppercase();
            self.tiles.push(LetterTile::new(id, value, *group));
            match self.groups.iter_mut().find(|g| g.value() == value) {
                Some(existing) => existing.push(id),
                None => {
                    let mut created = LetterGroup::new(*group, value);
                    created.push(id);
                    self.groups.push(created);
                }
            }
        }

        for (position, tiers) in self.positions.iter_mut().zip(&data.history) {
            for (group, tier) in tiers.iter().enumerate() {
                position.record(group, *tier);
            }
        }

        let mut restored = vec![false; self.tiles.len()];
        for (index, letter) in data.placements.iter().enumerate() {
            let Some(letter) = letter else { continue };
            let value = letter.to_ascii_uppercase();
            let tile = self
                .tiles
                .iter()
                .position(|t| t.value() == value && !restored[t.id()])
                .ok_or_else(|| LoadError::new(format!("No tile left to restore '{}'", value)))?;
            restored[tile] = true;
            self.assign(index, tile)
                .map_err(|e| LoadError::new(format!("Failed to restore '{}': {}", value, e)))?;
            if self.positions[index].tier(self.tiles[tile].group()).is_confirmed() {
                self.lock_position(index);
            }
        }

        self.remaining_turns = self.max_turns - data.turns_used;
        self.status = if data.status.is_terminal() {
            data.status
        } else {
            self.evaluate()
        };
        self.words[0].activate(&self.positions);

        info!(
            tiles = self.tiles.len(),
            groups = self.groups.len(),
            remaining_turns = self.remaining_turns,
            status = %self.status,
            "Puzzle loaded"
        );
        assert_invariants(self);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Snapshot accessors
// ─────────────────────────────────────────────────────────────

impl PuzzleEngine {
    /// Every tile in creation order.
    pub fn tiles(&self) -> &[LetterTile] {
        &self.tiles
    }

    /// One group per distinct letter value, in order of first appearance.
    pub fn groups(&self) -> &[LetterGroup] {
        &self.groups
    }

    /// The twelve positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// The three words.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Index of the word receiving input.
    pub fn active_word_index(&self) -> usize {
        self.active
    }

    /// The word receiving input.
    pub fn active_word(&self) -> &Word {
        &self.words[self.active]
    }

    /// Position under the active word's focus.
    pub fn focused_position(&self) -> PositionIndex {
        self.active_word().focused_position()
    }

    /// Configured turn budget.
    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Turns left before the game is lost.
    pub fn remaining_turns(&self) -> u32 {
        self.remaining_turns
    }

    /// Turns consumed so far.
    pub fn turns_used(&self) -> u32 {
        self.max_turns - self.remaining_turns
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Group holding a letter value, case-insensitively.
    pub fn group_for(&self, letter: char) -> Option<&LetterGroup> {
        let value = letter.to_ascii_uppercase();
        self.groups.iter().find(|g| g.value() == value)
    }

    /// Tier to display at a position: the history entry for the occupying
    /// tile's group, untried when empty.
    pub fn displayed_tier(&self, index: PositionIndex) -> Tier {
        self.positions
            .get(index)
            .and_then(|position| {
                let tile = position.occupant()?;
                Some(position.tier(self.tiles[tile].group()))
            })
            .unwrap_or_default()
    }

    /// Letter shown at a position, if a tile is there.
    pub fn letter_at(&self, index: PositionIndex) -> Option<char> {
        let tile = self.positions.get(index)?.occupant()?;
        Some(self.tiles[tile].value())
    }
}

// ─────────────────────────────────────────────────────────────
//  Placement
// ─────────────────────────────────────────────────────────────

impl PuzzleEngine {
    /// Places the best available tile of `letter` at the focused position
    /// and advances the focus.
    ///
    /// Returns the position that received the tile.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::GameOver`] once the game has ended
    /// - [`PuzzleError::InvalidLetter`] if the letter is not in the puzzle
    /// - [`PuzzleError::LetterExhausted`] if every tile of it is committed
    /// - [`PuzzleError::PositionLocked`] if the focus sits on a locked position
    #[instrument(skip(self), fields(active_word = self.active))]
    pub fn place_letter(&mut self, letter: char) -> Result<PositionIndex, PuzzleError> {
        GameInProgress::check(self)?;
        let value = letter.to_ascii_uppercase();
        let group = self.group_for(value).ok_or_else(|| {
            warn!(letter = %value, "Letter not in puzzle");
            PuzzleError::InvalidLetter(value)
        })?;
        let tile = group.resolve(&self.tiles).ok_or_else(|| {
            warn!(letter = %value, "Letter exhausted");
            PuzzleError::LetterExhausted(value)
        })?;
        self.place_at_focus(tile)
    }

    /// Places a specific tile at the focused position and advances the focus.
    ///
    /// A tile already on the board is moved.
    ///
    /// # Errors
    ///
    /// Same as [`PuzzleEngine::place_letter`], plus [`PuzzleError::InvalidTile`].
    #[instrument(skip(self), fields(active_word = self.active))]
    pub fn place_tile(&mut self, tile: TileId) -> Result<PositionIndex, PuzzleError> {
        GameInProgress::check(self)?;
        let chosen = self.tiles.get(tile).ok_or(PuzzleError::InvalidTile(tile))?;
        if !chosen.is_usable() {
            return Err(PuzzleError::LetterExhausted(chosen.value()));
        }
        self.place_at_focus(tile)
    }

    fn place_at_focus(&mut self, tile: TileId) -> Result<PositionIndex, PuzzleError> {
        let target = self.focused_position();
        self.assign(target, tile)?;
        self.words[self.active].shift_focus(&self.positions, Direction::Forward);
        debug!(tile, position = target, "Tile placed");
        assert_invariants(self);
        Ok(target)
    }

    /// Puts `tile` at `target`, first lifting it from wherever it was and
    /// returning any displaced tile to the pool.
    fn assign(&mut self, target: PositionIndex, tile: TileId) -> Result<(), PuzzleError> {
        if self.positions[target].is_locked() {
            return Err(PuzzleError::PositionLocked(target));
        }
        let previous = self.tiles[tile].position();
        if previous == Some(target) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.positions[previous]
                .set_occupant(None)
                .map_err(|_| PuzzleError::PositionLocked(previous))?;
        }
        let displaced = self.positions[target]
            .set_occupant(Some(tile))
            .map_err(|_| PuzzleError::PositionLocked(target))?;
        if let Some(displaced) = displaced {
            self.tiles[displaced].set_position(None);
        }
        self.tiles[tile].set_position(Some(target));
        Ok(())
    }

    /// Removes the tile at the focused position, or moves the focus back when
    /// there is nothing to remove.
    ///
    /// Returns the tile that was removed.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::GameOver`] once the game has ended.
    #[instrument(skip(self), fields(active_word = self.active))]
    pub fn clear_focused_position(&mut self) -> Result<Option<TileId>, PuzzleError> {
        GameInProgress::check(self)?;
        let target = self.focused_position();
        let removed = match self.positions[target].occupant() {
            Some(tile) if !self.positions[target].is_locked() => {
                self.lift(target, tile);
                Some(tile)
            }
            _ => {
                self.words[self.active].shift_focus(&self.positions, Direction::Backward);
                None
            }
        };
        debug!(position = target, ?removed, "Cleared focused position");
        assert_invariants(self);
        Ok(removed)
    }

    /// Returns every tile on an unlocked position to the pool.
    ///
    /// Returns how many tiles were removed.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::GameOver`] once the game has ended.
    #[instrument(skip(self))]
    pub fn clear_all_letters(&mut self) -> Result<usize, PuzzleError> {
        GameInProgress::check(self)?;
        let occupied: Vec<(PositionIndex, TileId)> = self
            .positions
            .iter()
            .filter(|p| !p.is_locked())
            .filter_map(|p| p.occupant().map(|tile| (p.index(), tile)))
            .collect();
        for (index, tile) in &occupied {
            self.lift(*index, *tile);
        }
        self.words[self.active].reset_focus(&self.positions);
        debug!(count = occupied.len(), "Cleared all letters");
        assert_invariants(self);
        Ok(occupied.len())
    }

    fn lift(&mut self, index: PositionIndex, tile: TileId) {
        if self.positions[index].set_occupant(None).is_ok() {
            self.tiles[tile].set_position(None);
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Navigation
// ─────────────────────────────────────────────────────────────

impl PuzzleEngine {
    /// Makes word `index` active and resets its focus.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidWord`] for an index outside 0-2.
    #[instrument(skip(self))]
    pub fn set_active_word(&mut self, index: usize) -> Result<(), PuzzleError> {
        if index >= self.words.len() {
            return Err(PuzzleError::InvalidWord(index));
        }
        self.words[self.active].deactivate();
        self.active = index;
        self.words[self.active].activate(&self.positions);
        debug!(active_word = index, focus = self.words[index].focus(), "Active word changed");
        Ok(())
    }

    /// Activates the neighbouring word, wrapping around the triangle.
    pub fn shift_active_word(&mut self, direction: Direction) {
        let next = direction.step(self.active, self.words.len());
        // next is always in range
        let _ = self.set_active_word(next);
    }

    /// Moves the active word's focus to the next unlocked slot.
    pub fn shift_focus(&mut self, direction: Direction) {
        self.words[self.active].shift_focus(&self.positions, direction);
    }

    /// Focuses slot `slot` of word `word` from pointer input.
    ///
    /// Only the active word accepts focus; locked slots are ignored. Returns
    /// whether the focus moved.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidWord`] for an index outside 0-2.
    #[instrument(skip(self))]
    pub fn focus_position(&mut self, word: usize, slot: usize) -> Result<bool, PuzzleError> {
        if word >= self.words.len() {
            return Err(PuzzleError::InvalidWord(word));
        }
        if word != self.active {
            debug!("Ignoring focus on inactive word");
            return Ok(false);
        }
        Ok(self.words[word].set_focus(&self.positions, slot))
    }
}

// ─────────────────────────────────────────────────────────────
//  Guessing
// ─────────────────────────────────────────────────────────────

impl PuzzleEngine {
    /// Extracts the text to send to the verifier.
    ///
    /// For the active word alone the other two words are left out. For the
    /// whole puzzle, words without any tile are left out.
    #[instrument(skip(self))]
    pub fn extract_guess(&self, scope: GuessScope) -> Guess {
        let words = std::array::from_fn(|index| {
            let word = &self.words[index];
            let submitted = match scope {
                GuessScope::ActiveWord => index == self.active,
                GuessScope::AllWords => word.has_letters(&self.positions),
            };
            submitted.then(|| word.text(&self.positions, &self.tiles))
        });
        Guess::new(words)
    }

    /// Applies verifier feedback for one successful guess.
    ///
    /// Each graded slot records its tier against the occupying tile's group;
    /// a confirmed tier locks the position and retires the tile. One turn is
    /// consumed. A terminal status reported by the verifier is adopted,
    /// otherwise the game is won when every word is locked and lost when the
    /// turns run out.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::GameOver`] or [`PuzzleError::MalformedFeedback`]
    /// without changing anything.
    #[instrument(skip(self, feedback), fields(remaining_turns = self.remaining_turns))]
    pub fn apply_feedback(&mut self, feedback: &Feedback) -> Result<GameStatus, PuzzleError> {
        FeedbackContract::pre(self, feedback)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        for (index, tiers) in feedback.words.iter().enumerate() {
            let Some(tiers) = tiers else { continue };
            let slots = *self.words[index].positions();
            for (position, tier) in slots.into_iter().zip(tiers) {
                self.grade(position, *tier);
            }
            self.words[index].refocus(&self.positions);
        }
        self.words[self.active].refocus(&self.positions);

        self.remaining_turns = self.remaining_turns.saturating_sub(1);
        self.status = match feedback.status {
            Some(reported) if reported.is_terminal() => reported,
            _ => self.evaluate(),
        };

        if self.status.is_terminal() {
            info!(status = %self.status, turns_used = self.turns_used(), "Game finished");
        } else {
            debug!(remaining_turns = self.remaining_turns, "Feedback applied");
        }

        #[cfg(debug_assertions)]
        FeedbackContract::post(&before, self)?;

        Ok(self.status)
    }

    fn grade(&mut self, index: PositionIndex, tier: Tier) {
        let Some(tile) = self.positions[index].occupant() else {
            return;
        };
        let group: GroupIndex = self.tiles[tile].group();
        if self.positions[index].record(group, tier) && tier.is_confirmed() {
            self.lock_position(index);
        }
    }

    fn lock_position(&mut self, index: PositionIndex) {
        let Some(tile) = self.positions[index].occupant() else {
            return;
        };
        self.positions[index].lock();
        self.tiles[tile].disable();

        debug!(position = index, tile, "Position locked");

        let group = self.tiles[tile].group();
        if let Some(spent) = self
            .groups
            .iter()
            .find(|g| g.index() == group && g.is_exhausted(&self.tiles))
        {
            info!(letter = %spent.value(), "Letter spent");
        }
    }

    fn evaluate(&self) -> GameStatus {
        if self.words.iter().all(|w| w.is_solved(&self.positions)) {
            GameStatus::Won
        } else if self.remaining_turns == 0 {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        Self::new(super::types::DEFAULT_MAX_TURNS)
    }
}
