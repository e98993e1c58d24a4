//! Configuration types for AI-vs-AI series
//!
//! Level 4 - Utilities and configuration

use xoarena_core::{AiDifficulty, BoardAdvance};

/// Safety cap on moves per match; a full match needs at most 72
pub const DEFAULT_MAX_MOVES: usize = 200;

/// Series configuration
#[derive(Clone, Debug)]
pub struct SeriesConfig {
    /// Difficulty of the first side
    pub first: AiDifficulty,
    /// Difficulty of the second side
    pub second: AiDifficulty,
    /// Number of matches to play
    pub games: usize,
    /// Swap marks every match so each side plays X half the time
    pub alternate_marks: bool,
    /// Random seed for reproducibility (None = 42)
    pub seed: Option<u64>,
    /// Whether to run matches in parallel
    pub parallel: bool,
    /// Active-board advance policy for every match
    pub board_advance: BoardAdvance,
    /// Maximum moves per match before giving up
    pub max_moves: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            first: AiDifficulty::Expert,
            second: AiDifficulty::Normal,
            games: 10,
            alternate_marks: true,
            seed: None,
            parallel: true,
            board_advance: BoardAdvance::Rotate,
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

impl SeriesConfig {
    /// Series between two difficulties
    pub fn new(first: AiDifficulty, second: AiDifficulty, games: usize) -> Self {
        Self {
            first,
            second,
            games,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set board advance policy
    pub fn with_board_advance(mut self, board_advance: BoardAdvance) -> Self {
        self.board_advance = board_advance;
        self
    }

    /// Run sequentially
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
