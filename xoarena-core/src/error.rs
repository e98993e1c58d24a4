//! Engine error types

use crate::game::GameState;

/// Why a match operation was rejected. A rejected operation never changes
/// match state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("match is not in progress (state: {0:?})")]
    NotPlaying(GameState),

    #[error("match is paused")]
    Paused,

    #[error("cell {0} is out of range (0-8)")]
    CellOutOfRange(usize),

    #[error("cell {cell} on board {board} is already taken")]
    CellOccupied { board: usize, cell: usize },

    #[error("board {0} is not the active board")]
    BoardInactive(usize),

    #[error("board {0} is already complete")]
    BoardComplete(usize),

    #[error("board index {0} is out of range (0-7)")]
    BoardOutOfRange(usize),

    #[error("no AI move is pending")]
    NoPendingAiMove,

    #[error("pending AI move was superseded")]
    StaleAiMove,

    #[error("AI found no legal move on board {0}")]
    AiNoLegalMove(usize),
}

/// Unrecognized option value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl ParseError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
