//! Position evaluation for the expert search
//!
//! Scores are always from O's point of view: the search treats O as the
//! maximizing side regardless of which mark the AI actually plays.

use crate::board::{Board, Cell, Player, WINNING_COMBINATIONS};
use serde::{Deserialize, Serialize};

/// Terminal win value before the depth adjustment
pub const WIN_VALUE: i32 = 10;

/// Line weights for the static heuristic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Two marks and an empty third cell
    pub two_in_line: i32,
    /// One mark and two empty cells
    pub one_in_line: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            two_in_line: 3,
            one_in_line: 1,
        }
    }
}

/// Static score of a non-terminal board
pub fn evaluate(board: &Board, heuristics: &Heuristics) -> i32 {
    let mut score = 0;

    for line in WINNING_COMBINATIONS {
        let (mut x, mut o, mut empty) = (0, 0, 0);
        for idx in line {
            match board.cells()[idx] {
                Cell::X => x += 1,
                Cell::O => o += 1,
                Cell::Empty => empty += 1,
            }
        }

        if x == 2 && empty == 1 {
            score -= heuristics.two_in_line;
        } else if o == 2 && empty == 1 {
            score += heuristics.two_in_line;
        } else if x == 1 && empty == 2 {
            score -= heuristics.one_in_line;
        } else if o == 1 && empty == 2 {
            score += heuristics.one_in_line;
        }
    }

    score
}

/// Terminal utility adjusted by search depth, None while the board is open.
/// Faster wins and slower losses score better.
pub fn evaluate_terminal(board: &Board, depth: i32) -> Option<i32> {
    match board.winner() {
        Some(Player::O) => Some(WIN_VALUE - depth),
        Some(Player::X) => Some(depth - WIN_VALUE),
        None if board.is_full() => Some(0),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Cell::{Empty as E, O, X};

    #[test]
    fn test_empty_board_is_neutral() {
        let board = Board::new(0);
        assert_eq!(evaluate(&board, &Heuristics::default()), 0);
    }

    #[test]
    fn test_threats_are_weighted() {
        // O holds two of the top row, X has a lone corner
        let board = Board::from_cells(0, [O, O, E, E, E, E, E, E, X]);
        let h = Heuristics::default();
        let score = evaluate(&board, &h);
        // rows: [O,O,E]=+3, [E,E,E]=0, [E,E,X]=-1
        // cols: [O,E,E]=+1, [O,E,E]=+1, [E,E,X]=-1
        // diags: [O,E,X]=0, [E,E,E]=0
        assert_eq!(score, 3);
    }

    #[test]
    fn test_heuristic_is_antisymmetric() {
        let board = Board::from_cells(0, [X, E, E, E, O, E, E, E, X]);
        let mirrored = Board::from_cells(0, [O, E, E, E, X, E, E, E, O]);
        let h = Heuristics::default();
        assert_eq!(evaluate(&board, &h), -evaluate(&mirrored, &h));
    }

    #[test]
    fn test_terminal_scores() {
        let o_win = Board::from_cells(0, [O, O, O, X, X, E, E, E, E]);
        let x_win = Board::from_cells(0, [X, X, X, O, O, E, E, E, E]);
        let draw = Board::from_cells(0, [X, O, X, O, X, O, O, X, O]);
        let open = Board::new(0);

        assert_eq!(evaluate_terminal(&o_win, 2), Some(8));
        assert_eq!(evaluate_terminal(&x_win, 2), Some(-8));
        assert_eq!(evaluate_terminal(&draw, 5), Some(0));
        assert_eq!(evaluate_terminal(&open, 0), None);
    }
}
