//! Single 3x3 board: cells, move legality and win detection
//!
//! Cells are indexed 0..8 in row-major order (`row = idx / 3`, `col = idx % 3`).
//! The free functions in this module are the whole board engine; they never
//! touch `is_active`, which belongs to the match sequencing.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of cells on a board
pub const BOARD_CELLS: usize = 9;

/// Center cell index
pub const CENTER: usize = 4;

/// Corner cell indices
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Winning lines: rows, then columns, then diagonals
pub const WINNING_COMBINATIONS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player mark
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opposite(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// The cell value this player writes
    pub fn mark(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// Content of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl Cell {
    /// Owner of the mark, if any
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }
}

/// One 3x3 board
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: usize,
    cells: [Cell; BOARD_CELLS],
    is_active: bool,
    winner: Option<Player>,
}

impl Board {
    /// Create an empty, inactive board
    pub fn new(id: usize) -> Self {
        Self {
            id,
            cells: [Cell::Empty; BOARD_CELLS],
            is_active: false,
            winner: None,
        }
    }

    /// Build a board from raw cells, recomputing the winner
    pub fn from_cells(id: usize, cells: [Cell; BOARD_CELLS]) -> Self {
        let mut board = Self {
            id,
            cells,
            is_active: false,
            winner: None,
        };
        board.winner = check_winner(&board);
        board
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.cells
    }

    /// Cell at index (None when out of range)
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// No empty cells left
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Won or full
    pub fn is_complete(&self) -> bool {
        self.winner.is_some() || self.is_full()
    }
}

// ============================================================================
// BOARD ENGINE
// ============================================================================

/// First winning line in declaration order, if any
pub fn check_winner(board: &Board) -> Option<Player> {
    for [a, b, c] in WINNING_COMBINATIONS {
        let mark = board.cells[a];
        if mark != Cell::Empty && mark == board.cells[b] && mark == board.cells[c] {
            return mark.player();
        }
    }
    None
}

/// Empty cell indices in ascending order
pub fn available_moves(board: &Board) -> Vec<usize> {
    board
        .cells
        .iter()
        .enumerate()
        .filter(|(_, &cell)| cell == Cell::Empty)
        .map(|(idx, _)| idx)
        .collect()
}

/// In range and empty
pub fn is_valid_move(index: usize, board: &Board) -> bool {
    board.cell(index) == Some(Cell::Empty)
}

/// Place a mark and recompute the winner. Returns false without mutating
/// when the move is not valid.
pub fn make_move(index: usize, player: Player, board: &mut Board) -> bool {
    if !is_valid_move(index, board) {
        return false;
    }
    board.cells[index] = player.mark();
    board.winner = check_winner(board);
    true
}
