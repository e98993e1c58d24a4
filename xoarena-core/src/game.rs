//! Match state and turn sequencing across the eight boards

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{AiDifficulty, AiPlayer};
use crate::board::{self, available_moves, Board, Player, BOARD_CELLS};
use crate::error::{MoveError, ParseError};
use crate::events::{MatchEvent, MatchObserver, TIMER_WARNINGS};
use crate::settings::{GameSettings, DEFAULT_AI_DELAY_MS};
use crate::stats::GameStats;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Boards per match
pub const BOARD_COUNT: usize = 8;

/// Board wins needed to take the match
pub const WINS_TO_WIN: usize = 5;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Match lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Menu,
    Playing,
    Paused,
    Finished,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Classic,
    Timed,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Classic => f.write_str("Classic"),
            GameMode::Timed => f.write_str("Timed"),
        }
    }
}

impl FromStr for GameMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(GameMode::Classic),
            "timed" => Ok(GameMode::Timed),
            _ => Err(ParseError::new("game mode", s)),
        }
    }
}

/// Supported timer lengths, serialized as seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimerDuration {
    OneMinute,
    TwoMinutes,
    #[default]
    ThreeMinutes,
    FiveMinutes,
}

impl TimerDuration {
    pub fn seconds(self) -> u32 {
        match self {
            TimerDuration::OneMinute => 60,
            TimerDuration::TwoMinutes => 120,
            TimerDuration::ThreeMinutes => 180,
            TimerDuration::FiveMinutes => 300,
        }
    }
}

impl TryFrom<u32> for TimerDuration {
    type Error = ParseError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        match seconds {
            60 => Ok(TimerDuration::OneMinute),
            120 => Ok(TimerDuration::TwoMinutes),
            180 => Ok(TimerDuration::ThreeMinutes),
            300 => Ok(TimerDuration::FiveMinutes),
            _ => Err(ParseError::new("timer duration", &seconds.to_string())),
        }
    }
}

impl From<TimerDuration> for u32 {
    fn from(duration: TimerDuration) -> Self {
        duration.seconds()
    }
}

impl FromStr for TimerDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds: u32 = s
            .trim()
            .parse()
            .map_err(|_| ParseError::new("timer duration", s))?;
        TimerDuration::try_from(seconds)
    }
}

/// How the active board moves on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardAdvance {
    /// After each X move, always `(index + 1) mod 8`, even onto a complete
    /// board. O finishing a board also leaves X on it. Either way the match
    /// stalls until the host picks another board.
    #[default]
    Rotate,
    /// After each X move, and whenever the active board is complete, move to
    /// the next board that is not complete yet
    SkipComplete,
}

/// Fixed for the lifetime of an engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Pacing delay attached to scheduled AI moves
    pub ai_delay: Duration,
    /// Seed for role assignment and AI randomness (None = entropy)
    pub seed: Option<u64>,
    pub board_advance: BoardAdvance,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ai_delay: Duration::from_millis(DEFAULT_AI_DELAY_MS),
            seed: None,
            board_advance: BoardAdvance::Rotate,
        }
    }
}

/// Handle for an AI move the host must fire later
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AiMoveTicket {
    generation: u64,
    move_count: u32,
    pub board: usize,
    pub player: Player,
    pub delay: Duration,
}

/// Result of an applied move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: usize,
    pub cell: usize,
    pub player: Player,
    /// The move finished its board
    pub board_completed: bool,
    pub board_winner: Option<Player>,
    /// The move finished the match
    pub match_finished: bool,
}

/// Read-only copy of the observable match state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub boards: Vec<Board>,
    pub current_player: Player,
    pub current_board_index: usize,
    pub x_score: u32,
    pub o_score: u32,
    pub draws: u32,
    pub winner: Option<Player>,
    pub game_state: GameState,
    pub time_remaining: Option<u32>,
}

// ============================================================================
// MATCH ENGINE
// ============================================================================

/// Owns the eight boards and all sequencing. Not thread-safe by design of
/// use: drive one engine from a single task.
pub struct MatchEngine {
    boards: [Board; BOARD_COUNT],
    current_board_index: usize,
    current_player: Player,

    x_score: u32,
    o_score: u32,
    draws: u32,
    winner: Option<Player>,
    state: GameState,

    /// Match configuration, read at start
    ai_enabled: bool,
    ai_difficulty: AiDifficulty,
    ai_player: Player,
    game_mode: GameMode,
    timer_duration: TimerDuration,
    time_remaining: Option<u32>,

    options: EngineOptions,
    /// Bumped on every reset so old tickets go stale
    generation: u64,
    move_count: u32,
    pending_ai: Option<AiMoveTicket>,

    stats: GameStats,
    rng: ChaCha8Rng,
    observers: Vec<Box<dyn MatchObserver>>,
}

impl MatchEngine {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Engine sitting in the menu with eight empty boards
    pub fn new(options: EngineOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            boards: std::array::from_fn(Board::new),
            current_board_index: 0,
            current_player: Player::X,
            x_score: 0,
            o_score: 0,
            draws: 0,
            winner: None,
            state: GameState::Menu,
            ai_enabled: false,
            ai_difficulty: AiDifficulty::Normal,
            ai_player: Player::O,
            game_mode: GameMode::Classic,
            timer_duration: TimerDuration::ThreeMinutes,
            time_remaining: None,
            options,
            generation: 0,
            move_count: 0,
            pending_ai: None,
            stats: GameStats::default(),
            rng,
            observers: Vec::new(),
        }
    }

    /// Continue counting on top of previously saved statistics
    pub fn with_stats(mut self, stats: GameStats) -> Self {
        self.stats = stats;
        self
    }

    /// Register an observer for every subsequent event
    pub fn subscribe(&mut self, observer: impl MatchObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn boards(&self) -> &[Board; BOARD_COUNT] {
        &self.boards
    }

    pub fn board(&self, index: usize) -> Option<&Board> {
        self.boards.get(index)
    }

    pub fn current_board(&self) -> &Board {
        &self.boards[self.current_board_index]
    }

    pub fn current_board_index(&self) -> usize {
        self.current_board_index
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn x_score(&self) -> u32 {
        self.x_score
    }

    pub fn o_score(&self) -> u32 {
        self.o_score
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Match winner (None while playing or after a drawn match)
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn game_state(&self) -> GameState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    /// Seconds left, present only in timed mode
    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    pub fn timer_duration(&self) -> TimerDuration {
        self.timer_duration
    }

    pub fn ai_difficulty(&self) -> AiDifficulty {
        self.ai_difficulty
    }

    /// Mark played by the AI, None without an AI opponent
    pub fn ai_player(&self) -> Option<Player> {
        self.ai_enabled.then_some(self.ai_player)
    }

    /// Mark played by the human, None without an AI opponent
    pub fn human_player(&self) -> Option<Player> {
        self.ai_player().map(Player::opposite)
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Indices of boards that are won or full
    pub fn completed_board_indices(&self) -> Vec<usize> {
        self.boards
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_complete())
            .map(|(i, _)| i)
            .collect()
    }

    /// Playing, but the active board cannot take another move
    pub fn is_stalled(&self) -> bool {
        self.state == GameState::Playing && self.current_board().is_complete()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            boards: self.boards.to_vec(),
            current_player: self.current_player,
            current_board_index: self.current_board_index,
            x_score: self.x_score,
            o_score: self.o_score,
            draws: self.draws,
            winner: self.winner,
            game_state: self.state,
            time_remaining: self.time_remaining,
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Configure and start a fresh match. With an AI opponent the marks are
    /// assigned at random; an AI holding X gets its first move scheduled
    /// before this returns.
    pub fn start_new_game(
        &mut self,
        ai_enabled: bool,
        ai_difficulty: AiDifficulty,
        game_mode: GameMode,
        timer_duration: TimerDuration,
    ) {
        self.ai_enabled = ai_enabled;
        self.ai_difficulty = ai_difficulty;
        self.game_mode = game_mode;
        self.timer_duration = timer_duration;

        if ai_enabled {
            self.ai_player = if self.rng.gen_bool(0.5) {
                Player::O
            } else {
                Player::X
            };
        }

        tracing::info!(
            "Starting match: mode={}, ai={}",
            game_mode,
            match self.ai_player() {
                Some(p) => format!("{} ({})", ai_difficulty, p),
                None => "off".to_string(),
            }
        );

        self.begin_match();
    }

    /// Start a match from the match-related settings fields
    pub fn start_from_settings(&mut self, settings: &GameSettings) {
        self.start_new_game(
            settings.ai_enabled,
            settings.ai_difficulty,
            settings.game_mode,
            settings.timer_duration,
        );
    }

    /// Restart with the current configuration and mark assignment
    pub fn reset_game(&mut self) {
        tracing::debug!("Resetting match");
        self.begin_match();
    }

    /// Playing -> Paused. Returns false when not playing.
    pub fn pause_game(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.state = GameState::Paused;
        self.emit(MatchEvent::Paused);
        true
    }

    /// Paused -> Playing. Returns false when not paused.
    pub fn resume_game(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.state = GameState::Playing;
        self.emit(MatchEvent::Resumed);
        true
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Play `cell` on the active board for the current player
    pub fn make_move(&mut self, cell: usize) -> Result<MoveOutcome, MoveError> {
        self.check_move(cell)?;

        let board_index = self.current_board_index;
        let player = self.current_player;

        if self.pending_ai.take().is_some() {
            self.emit(MatchEvent::AiMoveCancelled);
        }

        let applied = board::make_move(cell, player, &mut self.boards[board_index]);
        debug_assert!(applied, "move was validated");
        self.move_count += 1;

        tracing::debug!("{} plays cell {} on board {}", player, cell, board_index);
        self.emit(MatchEvent::MoveApplied {
            board: board_index,
            cell,
            player,
        });

        let board_completed = self.boards[board_index].is_complete();
        let board_winner = self.boards[board_index].winner();
        if board_completed {
            self.record_board_completion(board_index, board_winner);
        }

        self.check_game_winner();

        self.current_player = self.current_player.opposite();
        let pair_done = self.current_player == Player::O;
        let left_on_complete = self.options.board_advance == BoardAdvance::SkipComplete
            && self.current_board().is_complete();
        // The active board stays put once the match is over
        if self.state == GameState::Playing && (pair_done || left_on_complete) {
            self.advance_board();
        }

        self.maybe_schedule_ai();

        Ok(MoveOutcome {
            board: board_index,
            cell,
            player,
            board_completed,
            board_winner,
            match_finished: self.state == GameState::Finished,
        })
    }

    /// Make another board the active one (manual navigation). A pending AI
    /// move is replaced by one for the new board.
    pub fn set_active_board(&mut self, index: usize) -> Result<(), MoveError> {
        match self.state {
            GameState::Playing => {}
            GameState::Paused => return Err(MoveError::Paused),
            other => return Err(MoveError::NotPlaying(other)),
        }
        if index >= BOARD_COUNT {
            return Err(MoveError::BoardOutOfRange(index));
        }

        self.cancel_pending_ai_move();
        self.current_board_index = index;
        self.update_active_board();
        self.emit(MatchEvent::ActiveBoardChanged { board: index });
        self.maybe_schedule_ai();
        Ok(())
    }

    fn check_move(&self, cell: usize) -> Result<(), MoveError> {
        match self.state {
            GameState::Playing => {}
            GameState::Paused => return Err(MoveError::Paused),
            other => return Err(MoveError::NotPlaying(other)),
        }

        let index = self.current_board_index;
        let board = &self.boards[index];
        if !board.is_active() {
            return Err(MoveError::BoardInactive(index));
        }
        if board.is_complete() {
            return Err(MoveError::BoardComplete(index));
        }
        if cell >= BOARD_CELLS {
            return Err(MoveError::CellOutOfRange(cell));
        }
        if !board::is_valid_move(cell, board) {
            return Err(MoveError::CellOccupied { board: index, cell });
        }
        Ok(())
    }

    fn record_board_completion(&mut self, board: usize, winner: Option<Player>) {
        match winner {
            Some(Player::X) => self.x_score += 1,
            Some(Player::O) => self.o_score += 1,
            None => self.draws += 1,
        }
        tracing::debug!(
            "Board {} complete: {} (X {} - O {}, draws {})",
            board,
            winner.map_or("draw".to_string(), |p| format!("{} wins", p)),
            self.x_score,
            self.o_score,
            self.draws
        );
        self.emit(MatchEvent::BoardCompleted { board, winner });
    }

    /// First to five board wins, otherwise a draw once every board is done
    fn check_game_winner(&mut self) {
        let x_wins = self.count_board_wins(Player::X);
        let o_wins = self.count_board_wins(Player::O);

        if x_wins >= WINS_TO_WIN {
            self.finish(Some(Player::X));
        } else if o_wins >= WINS_TO_WIN {
            self.finish(Some(Player::O));
        } else if self.boards.iter().all(Board::is_complete) {
            self.finish(None);
        }
    }

    fn count_board_wins(&self, player: Player) -> usize {
        self.boards
            .iter()
            .filter(|b| b.winner() == Some(player))
            .count()
    }

    fn advance_board(&mut self) {
        let next = match self.options.board_advance {
            BoardAdvance::Rotate => (self.current_board_index + 1) % BOARD_COUNT,
            BoardAdvance::SkipComplete => (1..=BOARD_COUNT)
                .map(|step| (self.current_board_index + step) % BOARD_COUNT)
                .find(|&i| !self.boards[i].is_complete())
                .unwrap_or((self.current_board_index + 1) % BOARD_COUNT),
        };

        self.current_board_index = next;
        self.update_active_board();
        self.emit(MatchEvent::ActiveBoardChanged { board: next });

        if self.is_stalled() {
            tracing::warn!("Board {} became active but is already complete", next);
        }
    }

    fn update_active_board(&mut self) {
        let current = self.current_board_index;
        for (i, board) in self.boards.iter_mut().enumerate() {
            board.set_active(i == current);
        }
    }

    // ========================================================================
    // AI TURN
    // ========================================================================

    /// AI move waiting to be fired by the host
    pub fn pending_ai_move(&self) -> Option<AiMoveTicket> {
        self.pending_ai
    }

    /// Drop the pending AI move. Returns false when none was pending.
    pub fn cancel_pending_ai_move(&mut self) -> bool {
        if self.pending_ai.take().is_some() {
            self.emit(MatchEvent::AiMoveCancelled);
            true
        } else {
            false
        }
    }

    /// Let the AI choose and play. A ticket from before a reset, a
    /// cancellation or any other move is rejected without effect; while paused
    /// the ticket stays pending. A pending ticket that no longer fits the
    /// match is dropped and, if the AI is still to move, replaced.
    pub fn run_pending_ai_move(&mut self, ticket: AiMoveTicket) -> Result<MoveOutcome, MoveError> {
        match self.pending_ai {
            None => return Err(MoveError::NoPendingAiMove),
            Some(pending) if pending != ticket => return Err(MoveError::StaleAiMove),
            Some(_) => {}
        }
        match self.state {
            GameState::Playing => {}
            GameState::Paused => return Err(MoveError::Paused),
            other => return Err(MoveError::NotPlaying(other)),
        }
        if ticket.generation != self.generation
            || ticket.move_count != self.move_count
            || ticket.board != self.current_board_index
            || ticket.player != self.current_player
        {
            tracing::warn!("Dropping stale AI move for board {}", ticket.board);
            self.cancel_pending_ai_move();
            self.maybe_schedule_ai();
            return Err(MoveError::StaleAiMove);
        }
        self.pending_ai = None;

        let board_index = self.current_board_index;
        let board = &self.boards[board_index];
        let ai = AiPlayer::new(self.ai_difficulty);

        let chosen = ai
            .get_move(board, &mut self.rng)
            .or_else(|| available_moves(board).choose(&mut self.rng).copied());

        let Some(cell) = chosen else {
            tracing::warn!("AI found no move on board {}", board_index);
            return Err(MoveError::AiNoLegalMove(board_index));
        };

        self.make_move(cell).map_err(|e| {
            tracing::warn!("AI move on board {} rejected: {}", board_index, e);
            e
        })
    }

    fn maybe_schedule_ai(&mut self) {
        if !self.ai_enabled
            || self.state != GameState::Playing
            || self.current_player != self.ai_player
        {
            return;
        }
        // Nothing to play here until the host picks another board
        if self.is_stalled() {
            return;
        }

        let ticket = AiMoveTicket {
            generation: self.generation,
            move_count: self.move_count,
            board: self.current_board_index,
            player: self.current_player,
            delay: self.options.ai_delay,
        };
        self.pending_ai = Some(ticket);
        self.emit(MatchEvent::AiMoveScheduled {
            board: ticket.board,
            delay: ticket.delay,
        });
    }

    // ========================================================================
    // TIMER
    // ========================================================================

    /// One second elapsed. Ignored unless a timed match is playing.
    pub fn update_timer(&mut self) {
        if self.game_mode != GameMode::Timed || self.state != GameState::Playing {
            return;
        }
        let Some(remaining) = self.time_remaining else {
            return;
        };

        let remaining = remaining.saturating_sub(1);
        self.time_remaining = Some(remaining);
        self.emit(MatchEvent::TimerTick { remaining });

        if TIMER_WARNINGS.contains(&remaining) {
            self.emit(MatchEvent::TimerWarning { remaining });
        }

        if remaining == 0 {
            let winner = match self.x_score.cmp(&self.o_score) {
                std::cmp::Ordering::Greater => Some(Player::X),
                std::cmp::Ordering::Less => Some(Player::O),
                std::cmp::Ordering::Equal => None,
            };
            tracing::info!("Time is up");
            self.finish(winner);
        }
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn begin_match(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.pending_ai.take().is_some() {
            self.emit(MatchEvent::AiMoveCancelled);
        }

        self.boards = std::array::from_fn(Board::new);
        self.current_board_index = 0;
        self.current_player = Player::X;
        self.x_score = 0;
        self.o_score = 0;
        self.draws = 0;
        self.winner = None;
        self.move_count = 0;
        self.time_remaining = match self.game_mode {
            GameMode::Timed => Some(self.timer_duration.seconds()),
            GameMode::Classic => None,
        };
        self.state = GameState::Playing;
        self.update_active_board();

        self.emit(MatchEvent::GameStarted {
            mode: self.game_mode,
            ai_player: self.ai_player(),
        });
        self.maybe_schedule_ai();
    }

    fn finish(&mut self, winner: Option<Player>) {
        if self.state == GameState::Finished {
            return;
        }
        self.state = GameState::Finished;
        self.winner = winner;
        if self.pending_ai.take().is_some() {
            self.emit(MatchEvent::AiMoveCancelled);
        }
        self.stats.record(winner);

        tracing::info!(
            "Match finished: {} (X {} - O {}, draws {})",
            winner.map_or("draw".to_string(), |p| format!("{} wins", p)),
            self.x_score,
            self.o_score,
            self.draws
        );
        self.emit(MatchEvent::GameFinished { winner });
    }

    fn emit(&mut self, event: MatchEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchEngine")
            .field("state", &self.state)
            .field("current_board_index", &self.current_board_index)
            .field("current_player", &self.current_player)
            .field("x_score", &self.x_score)
            .field("o_score", &self.o_score)
            .field("draws", &self.draws)
            .field("winner", &self.winner)
            .field("time_remaining", &self.time_remaining)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
