//! Word Trinity library - the triangle word puzzle
//!
//! Three five-letter words share their corner letters, so twelve positions
//! hold fifteen word slots. The player places letters from a fixed pool,
//! submits guesses for grading, and confirmed letters lock in place.
//!
//! # Architecture
//!
//! - **Puzzle**: the synchronous, renderer-independent engine
//! - **Backend**: load, verification and statistics collaborators (HTTP)
//! - **Session**: the async boundary, one guess in flight at a time
//! - **View / Input**: display snapshots and keyboard commands
//!
//! # Example
//!
//! ```
//! use word_trinity::{GuessScope, PuzzleData, PuzzleEngine};
//!
//! let mut engine = PuzzleEngine::from_data(PuzzleData::from_letters("abcdaefgahij"), 10).unwrap();
//! engine.place_letter('a').unwrap();
//! engine.place_letter('b').unwrap();
//! let guess = engine.extract_guess(GuessScope::ActiveWord);
//! assert_eq!(guess.to_wire(), ["ab".to_string(), "None".to_string(), "None".to_string()]);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod backend;
mod config;
mod input;
mod session;
mod stats;
mod view;

pub mod puzzle;

// Crate-level exports - Engine
pub use puzzle::{
    Direction, Feedback, GameStatus, Guess, GuessScope, LoadError, PuzzleData, PuzzleEngine,
    PuzzleError, Tier,
};

// Crate-level exports - Collaborators
pub use backend::{BackendError, HttpBackend, PuzzleBackend, GENERIC_FAILURE};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, SERVER_URL_ENV, USER_ID_ENV};

// Crate-level exports - Session management
pub use session::{PuzzleSession, SessionError, LOAD_FAILURE};

// Crate-level exports - Statistics
pub use stats::{round_half_up, summarize, user_win_rate, GameRecord, Statistics, StatsSubject, Summary};

// Crate-level exports - Display and input
pub use input::{command_for, dispatch, Command};
pub use view::{share_message, BoardView, CellView, PoolTile, WordView};
