//! Change notification for whatever sits on top of the engine
//!
//! The engine stays passive and synchronous: after each state-mutating call it
//! hands every registered observer the events that call produced, in order.

use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::board::Player;
use crate::game::GameMode;

/// Seconds remaining at which a timer warning is published
pub const TIMER_WARNINGS: [u32; 2] = [30, 10];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchEvent {
    GameStarted {
        mode: GameMode,
        ai_player: Option<Player>,
    },
    MoveApplied {
        board: usize,
        cell: usize,
        player: Player,
    },
    /// `winner` is None for a drawn board
    BoardCompleted {
        board: usize,
        winner: Option<Player>,
    },
    ActiveBoardChanged {
        board: usize,
    },
    AiMoveScheduled {
        board: usize,
        delay: Duration,
    },
    AiMoveCancelled,
    TimerTick {
        remaining: u32,
    },
    TimerWarning {
        remaining: u32,
    },
    Paused,
    Resumed,
    GameFinished {
        winner: Option<Player>,
    },
}

/// Receives engine events
pub trait MatchObserver {
    fn on_event(&mut self, event: &MatchEvent);
}

impl<F> MatchObserver for F
where
    F: FnMut(&MatchEvent),
{
    fn on_event(&mut self, event: &MatchEvent) {
        self(event)
    }
}

/// Forward events into a channel; a dropped receiver is ignored
impl MatchObserver for Sender<MatchEvent> {
    fn on_event(&mut self, event: &MatchEvent) {
        let _ = self.send(event.clone());
    }
}
