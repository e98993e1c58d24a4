//! Series play - many matches between two difficulties
//!
//! Level 2 - Phase-level implementation

use rayon::prelude::*;

use crate::config::SeriesConfig;
use crate::game_runner::{GameRunner, MatchEnd, MatchOutcome};

/// Result of a series (multiple matches)
#[derive(Clone, Debug)]
pub struct SeriesResult {
    /// Wins for the first side
    pub first_wins: u32,
    /// Wins for the second side
    pub second_wins: u32,
    /// Matches finished without a winner
    pub draws: u32,
    /// Matches that stalled on a complete board
    pub stalled: u32,
    /// Matches that hit the move cap
    pub aborted: u32,
    /// Wins by mark, regardless of side
    pub x_wins: u32,
    pub o_wins: u32,
    /// Average match length in moves
    pub avg_moves: f32,
    /// Total matches played
    pub games_played: u32,
    /// Individual outcomes with the side that held X
    pub outcomes: Vec<SeriesGame>,
}

/// One match of a series
#[derive(Clone, Debug)]
pub struct SeriesGame {
    pub index: usize,
    /// True if the first side played X
    pub first_played_x: bool,
    pub outcome: MatchOutcome,
}

impl SeriesResult {
    /// Create empty result
    pub fn empty() -> Self {
        Self {
            first_wins: 0,
            second_wins: 0,
            draws: 0,
            stalled: 0,
            aborted: 0,
            x_wins: 0,
            o_wins: 0,
            avg_moves: 0.0,
            games_played: 0,
            outcomes: Vec::new(),
        }
    }

    /// Get win rate for the first side
    pub fn first_win_rate(&self) -> f32 {
        self.rate(self.first_wins)
    }

    /// Get win rate for the second side
    pub fn second_win_rate(&self) -> f32 {
        self.rate(self.second_wins)
    }

    /// Get draw rate
    pub fn draw_rate(&self) -> f32 {
        self.rate(self.draws)
    }

    fn rate(&self, count: u32) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            count as f32 / self.games_played as f32
        }
    }
}

/// Play a series (Level 2 phase)
///
/// `on_game` is called once per finished match, possibly from worker threads.
pub fn play_series<F>(config: &SeriesConfig, on_game: F) -> SeriesResult
where
    F: Fn(&SeriesGame) + Sync,
{
    if config.games == 0 {
        return SeriesResult::empty();
    }

    tracing::info!(
        "Starting series: {} vs {} ({} matches, {:?})",
        config.first,
        config.second,
        config.games,
        config.board_advance
    );

    let plans = prepare_games(config);
    let games: Vec<SeriesGame> = if config.parallel {
        plans
            .par_iter()
            .map(|plan| {
                let game = play_planned(config, plan);
                on_game(&game);
                game
            })
            .collect()
    } else {
        plans
            .iter()
            .map(|plan| {
                let game = play_planned(config, plan);
                on_game(&game);
                game
            })
            .collect()
    };

    aggregate_results(games)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Configuration for a single match in a series
#[derive(Clone, Copy)]
struct GamePlan {
    index: usize,
    first_plays_x: bool,
    seed: u64,
}

fn prepare_games(config: &SeriesConfig) -> Vec<GamePlan> {
    let base_seed = config.seed.unwrap_or(42);
    (0..config.games)
        .map(|index| GamePlan {
            index,
            first_plays_x: !config.alternate_marks || index % 2 == 0,
            seed: base_seed.wrapping_add(index as u64),
        })
        .collect()
}

fn play_planned(config: &SeriesConfig, plan: &GamePlan) -> SeriesGame {
    let (x, o) = if plan.first_plays_x {
        (config.first, config.second)
    } else {
        (config.second, config.first)
    };
    let runner = GameRunner::new(x, o, config.board_advance, config.max_moves);
    let outcome = runner.play_match(plan.seed);

    tracing::debug!(
        "Match {}: {:?} winner={:?} ({} moves)",
        plan.index + 1,
        outcome.end,
        outcome.winner,
        outcome.moves
    );

    SeriesGame {
        index: plan.index,
        first_played_x: plan.first_plays_x,
        outcome,
    }
}

/// Aggregate match outcomes into a series result
fn aggregate_results(games: Vec<SeriesGame>) -> SeriesResult {
    let mut result = SeriesResult::empty();
    let mut total_moves = 0usize;

    for game in &games {
        let outcome = &game.outcome;
        total_moves += outcome.moves;

        match outcome.end {
            MatchEnd::Stalled => result.stalled += 1,
            MatchEnd::Aborted => result.aborted += 1,
            MatchEnd::Finished => {}
        }

        match outcome.winner {
            Some(mark) => {
                if outcome.x_wins() {
                    result.x_wins += 1;
                } else {
                    result.o_wins += 1;
                }
                let first_won = (mark == xoarena_core::Player::X) == game.first_played_x;
                if first_won {
                    result.first_wins += 1;
                } else {
                    result.second_wins += 1;
                }
            }
            None if outcome.is_draw() => result.draws += 1,
            None => {}
        }
    }

    result.games_played = games.len() as u32;
    result.avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };
    result.outcomes = games;
    result
}
