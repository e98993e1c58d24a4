//! XOArena Core - Game engine and AI
//!
//! This crate provides the core game logic for XOArena, eight tic-tac-toe
//! boards played in sequence where the first player to five board wins takes
//! the match:
//! - Single-board state, move legality and win detection
//! - Match sequencing, scoring, timer and pause handling
//! - Computer opponent (random, greedy, minimax with alpha-beta)
//! - Change notification, settings and lifetime statistics

pub mod board;
pub mod game;
pub mod eval;
pub mod ai;
pub mod error;
pub mod events;
pub mod settings;
pub mod stats;

// Re-exports for convenient access
pub use board::{Board, Cell, Player, BOARD_CELLS, WINNING_COMBINATIONS};
pub use game::{
    AiMoveTicket, BoardAdvance, EngineOptions, GameMode, GameState, MatchEngine, MatchSnapshot,
    MoveOutcome, TimerDuration, BOARD_COUNT, WINS_TO_WIN,
};
pub use eval::{Heuristics, evaluate, WIN_VALUE};
pub use ai::{AiDifficulty, AiPlayer};
pub use error::{MoveError, ParseError};
pub use events::{MatchEvent, MatchObserver};
pub use settings::GameSettings;
pub use stats::GameStats;
