//! Game runner - plays a single AI-vs-AI match through the engine API
//!
//! Level 3 - Step-level implementation

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use xoarena_core::{
    AiDifficulty, AiPlayer, BoardAdvance, EngineOptions, GameMode, GameState, MatchEngine, Player,
    TimerDuration,
};

/// How a match ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchEnd {
    /// Finished by the rules (five wins or every board complete)
    Finished,
    /// Active board was already complete
    Stalled,
    /// Move cap reached or no move could be applied
    Aborted,
}

/// Outcome of a single match
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    /// Match winner (None for a draw or an unfinished match)
    pub winner: Option<Player>,
    pub end: MatchEnd,
    pub x_score: u32,
    pub o_score: u32,
    pub draws: u32,
    /// Moves applied
    pub moves: usize,
}

impl MatchOutcome {
    /// Check if X won
    pub fn x_wins(&self) -> bool {
        self.winner == Some(Player::X)
    }

    /// Check if O won
    pub fn o_wins(&self) -> bool {
        self.winner == Some(Player::O)
    }

    /// Finished by the rules without a winner
    pub fn is_draw(&self) -> bool {
        self.end == MatchEnd::Finished && self.winner.is_none()
    }
}

/// Plays matches between two fixed difficulties
pub struct GameRunner {
    x_ai: AiPlayer,
    o_ai: AiPlayer,
    board_advance: BoardAdvance,
    max_moves: usize,
}

impl GameRunner {
    /// Create a new game runner
    pub fn new(x: AiDifficulty, o: AiDifficulty, board_advance: BoardAdvance, max_moves: usize) -> Self {
        Self {
            x_ai: AiPlayer::new(x),
            o_ai: AiPlayer::new(o),
            board_advance,
            max_moves,
        }
    }

    /// Play one classic match, returning the outcome
    pub fn play_match(&self, seed: u64) -> MatchOutcome {
        let mut engine = MatchEngine::new(EngineOptions {
            ai_delay: Duration::ZERO,
            seed: Some(seed),
            board_advance: self.board_advance,
        });
        engine.start_new_game(false, AiDifficulty::Normal, GameMode::Classic, TimerDuration::default());

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut moves = 0;

        let end = loop {
            if engine.game_state() == GameState::Finished {
                break MatchEnd::Finished;
            }
            if engine.is_stalled() {
                break MatchEnd::Stalled;
            }
            if moves >= self.max_moves {
                break MatchEnd::Aborted;
            }

            let ai = match engine.current_player() {
                Player::X => &self.x_ai,
                Player::O => &self.o_ai,
            };
            let Some(cell) = ai.get_move(engine.current_board(), &mut rng) else {
                break MatchEnd::Aborted;
            };
            if let Err(e) = engine.make_move(cell) {
                tracing::warn!("Runner move rejected: {}", e);
                break MatchEnd::Aborted;
            }
            moves += 1;
        };

        MatchOutcome {
            winner: engine.winner(),
            end,
            x_score: engine.x_score(),
            o_score: engine.o_score(),
            draws: engine.draws(),
            moves,
        }
    }
}
