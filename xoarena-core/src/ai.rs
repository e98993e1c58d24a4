//! Computer opponent at three difficulty tiers
//!
//! The hard and expert tiers always reason as if the AI plays O. When the AI
//! is assigned X the search still maximizes for O, so its choices are those
//! of an O player on the same position. This is a known limitation kept for
//! behavioral compatibility.

use std::fmt;
use std::str::FromStr;

use crate::board::{
    available_moves, make_move, Board, Player, CENTER, CORNERS,
};
use crate::error::ParseError;
use crate::eval::{evaluate, evaluate_terminal, Heuristics};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Mark the hard and expert tiers play for
pub const AI_MARK: Player = Player::O;

/// Plies searched before falling back to the static heuristic
const MAX_SEARCH_DEPTH: i32 = 6;

// ============================================================================
// DIFFICULTY
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiDifficulty {
    /// Uniform random
    #[default]
    Normal,
    /// Win, block, center, corner, random
    Hard,
    /// Minimax with alpha-beta pruning
    Expert,
}

impl AiDifficulty {
    pub const ALL: [AiDifficulty; 3] = [
        AiDifficulty::Normal,
        AiDifficulty::Hard,
        AiDifficulty::Expert,
    ];
}

impl fmt::Display for AiDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiDifficulty::Normal => "Normal",
            AiDifficulty::Hard => "Hard",
            AiDifficulty::Expert => "Expert",
        };
        f.write_str(name)
    }
}

impl FromStr for AiDifficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(AiDifficulty::Normal),
            "hard" => Ok(AiDifficulty::Hard),
            "expert" => Ok(AiDifficulty::Expert),
            _ => Err(ParseError::new("difficulty", s)),
        }
    }
}

// ============================================================================
// AI PLAYER
// ============================================================================

/// Stateless move picker; randomness is supplied by the caller
#[derive(Clone, Debug)]
pub struct AiPlayer {
    difficulty: AiDifficulty,
    heuristics: Heuristics,
}

impl AiPlayer {
    pub fn new(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            heuristics: Heuristics::default(),
        }
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.difficulty
    }

    /// Pick a cell on `board`. None only when no cell is empty.
    pub fn get_move<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Option<usize> {
        let moves = available_moves(board);
        if moves.is_empty() {
            return None;
        }

        match self.difficulty {
            AiDifficulty::Normal => moves.choose(rng).copied(),
            AiDifficulty::Hard => hard_move(board, &moves, rng),
            AiDifficulty::Expert => expert_move(board, &moves, &self.heuristics),
        }
    }
}

// ============================================================================
// HARD
// ============================================================================

fn hard_move<R: Rng + ?Sized>(board: &Board, moves: &[usize], rng: &mut R) -> Option<usize> {
    if let Some(mv) = find_winning_move(board, AI_MARK, moves) {
        return Some(mv);
    }
    if let Some(mv) = find_winning_move(board, AI_MARK.opposite(), moves) {
        return Some(mv);
    }
    if moves.contains(&CENTER) {
        return Some(CENTER);
    }

    let corners: Vec<usize> = moves
        .iter()
        .copied()
        .filter(|mv| CORNERS.contains(mv))
        .collect();
    if let Some(&corner) = corners.choose(rng) {
        return Some(corner);
    }

    moves.choose(rng).copied()
}

/// First move (ascending) that completes a line for `player`
fn find_winning_move(board: &Board, player: Player, moves: &[usize]) -> Option<usize> {
    moves.iter().copied().find(|&mv| {
        let mut child = board.clone();
        make_move(mv, player, &mut child) && child.winner() == Some(player)
    })
}

// ============================================================================
// EXPERT (MINIMAX WITH ALPHA-BETA)
// ============================================================================

fn expert_move(board: &Board, moves: &[usize], heuristics: &Heuristics) -> Option<usize> {
    let mut best_move = None;
    let mut best_score = i32::MIN;

    for &mv in moves {
        let mut child = board.clone();
        if !make_move(mv, AI_MARK, &mut child) {
            continue;
        }

        let score = minimax(&child, 0, i32::MIN, i32::MAX, false, heuristics);
        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
    }

    best_move
}

fn minimax(
    board: &Board,
    depth: i32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    heuristics: &Heuristics,
) -> i32 {
    if let Some(score) = evaluate_terminal(board, depth) {
        return score;
    }

    if depth > MAX_SEARCH_DEPTH {
        return evaluate(board, heuristics);
    }

    let mover = if maximizing { AI_MARK } else { AI_MARK.opposite() };

    if maximizing {
        let mut best = i32::MIN;
        for mv in available_moves(board) {
            let mut child = board.clone();
            if !make_move(mv, mover, &mut child) {
                continue;
            }
            let score = minimax(&child, depth + 1, alpha, beta, false, heuristics);
            best = best.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for mv in available_moves(board) {
            let mut child = board.clone();
            if !make_move(mv, mover, &mut child) {
                continue;
            }
            let score = minimax(&child, depth + 1, alpha, beta, true, heuristics);
            best = best.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

// ============================================================================
// TESTS
// ============================================================================
