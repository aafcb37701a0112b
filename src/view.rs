//! Renderer-independent board snapshot and its plain-text form.

use crate::puzzle::{GameStatus, PositionIndex, PuzzleEngine, Tier, TileId};
use std::fmt;

/// One slot of a word row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    /// Board position behind the slot.
    pub position: PositionIndex,
    /// Letter on the position, if any.
    pub letter: Option<char>,
    /// Tier to colour the slot with.
    pub tier: Tier,
    /// Whether the position is locked.
    pub locked: bool,
    /// Whether the slot holds the active word's focus.
    pub focused: bool,
}

/// One word row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordView {
    /// Word index.
    pub index: usize,
    /// Whether the word receives input.
    pub active: bool,
    /// The five slots in word order.
    pub cells: Vec<CellView>,
}

/// One tile of the letter pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTile {
    /// Tile id, for pointer placement.
    pub id: TileId,
    /// Letter value.
    pub letter: char,
    /// Whether the tile sits on the board.
    pub placed: bool,
    /// Whether the tile can still be moved.
    pub usable: bool,
}

/// Everything a display needs from the engine, copied out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// The three word rows.
    pub words: Vec<WordView>,
    /// Every tile in creation order.
    pub pool: Vec<PoolTile>,
    /// Game status.
    pub status: GameStatus,
    /// Turns left.
    pub remaining_turns: u32,
}

impl BoardView {
    /// Copies the displayable state out of `engine`.
    pub fn from_engine(engine: &PuzzleEngine) -> Self {
        let focused = engine.focused_position();
        let words = engine
            .words()
            .iter()
            .map(|word| WordView {
                index: word.index(),
                active: word.is_active(),
                cells: word
                    .positions()
                    .iter()
                    .map(|&position| CellView {
                        position,
                        letter: engine.letter_at(position),
                        tier: engine.displayed_tier(position),
                        locked: engine.positions()[position].is_locked(),
                        focused: word.is_active() && position == focused,
                    })
                    .collect(),
            })
            .collect();
        let pool = engine
            .tiles()
            .iter()
            .map(|tile| PoolTile {
                id: tile.id(),
                letter: tile.value(),
                placed: !tile.is_unplaced(),
                usable: tile.is_usable(),
            })
            .collect();

        Self {
            words,
            pool,
            status: engine.status(),
            remaining_turns: engine.remaining_turns(),
        }
    }

    /// Turn counter, or the final result once the game is over.
    pub fn status_line(&self) -> String {
        match self.status {
            GameStatus::InProgress => format!("Turns remaining: {}", self.remaining_turns),
            GameStatus::Won => "Game won".to_string(),
            GameStatus::Lost => "Game over".to_string(),
        }
    }
}

fn tier_marker(cell: &CellView) -> char {
    if cell.locked {
        '#'
    } else if cell.letter.is_none() || cell.tier.is_untried() {
        ' '
    } else {
        char::from(b'0' + cell.tier.value())
    }
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status_line())?;
        for word in &self.words {
            write!(f, "{} {}:", if word.active { '>' } else { ' ' }, word.index + 1)?;
            for cell in &word.cells {
                let (open, close) = if cell.focused { ('[', ']') } else { (' ', ' ') };
                write!(
                    f,
                    "{}{}{}{}",
                    open,
                    cell.letter.unwrap_or('_'),
                    tier_marker(cell),
                    close
                )?;
            }
            writeln!(f)?;
        }
        write!(f, "Letters:")?;
        for tile in &self.pool {
            let shown = match (tile.usable, tile.placed) {
                (false, _) => '.',
                (true, true) => tile.letter.to_ascii_lowercase(),
                (true, false) => tile.letter,
            };
            write!(f, " {}", shown)?;
        }
        writeln!(f)
    }
}

/// Text to share once a game has finished. `None` while it is in progress.
pub fn share_message(status: GameStatus, turns_used: u32) -> Option<String> {
    let intro = "Have you tried today's Word Trinity? Can you beat the average guesses?";
    match status {
        GameStatus::InProgress => None,
        GameStatus::Won => Some(format!("{} I beat it in {} turns!", intro, turns_used)),
        GameStatus::Lost => Some(format!("{} I couldn't beat it!", intro)),
    }
}
