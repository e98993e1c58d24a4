//! Integration tests for XOArena
//!
//! Tests the full stack: board rules, match sequencing, AI players and
//! headless series, all through the public API

use std::sync::mpsc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use xoarena_core::{
    board::{available_moves, check_winner, make_move},
    AiDifficulty, AiPlayer, Board, BoardAdvance, Cell, EngineOptions, GameMode, GameSettings,
    GameState, MatchEngine, MatchEvent, MoveError, Player, TimerDuration,
};
use xoarena_tournament::{play_series, GameRunner, MatchEnd, SeriesConfig};

// ============================================================================
// TEST FIXTURES
// ============================================================================

const E: Cell = Cell::Empty;
const X: Cell = Cell::X;
const O: Cell = Cell::O;

fn engine(board_advance: BoardAdvance) -> MatchEngine {
    MatchEngine::new(EngineOptions {
        ai_delay: Duration::ZERO,
        seed: Some(7),
        board_advance,
    })
}

/// Play `cells` in order on one board, re-selecting it before each move
fn play_on(engine: &mut MatchEngine, board: usize, cells: &[usize]) {
    for &cell in cells {
        engine.set_active_board(board).unwrap();
        engine.make_move(cell).unwrap();
    }
}

fn assert_consistent(engine: &MatchEngine) {
    let complete = engine.completed_board_indices().len() as u32;
    assert_eq!(engine.x_score() + engine.o_score() + engine.draws(), complete);
    let active = engine.boards().iter().filter(|b| b.is_active()).count();
    assert!(active <= 1);
}

// ============================================================================
// BOARD RULES
// ============================================================================

#[test]
fn test_top_row_win() {
    let mut board = Board::new(0);
    for (cell, player) in [(0, Player::X), (4, Player::O), (1, Player::X), (5, Player::O), (2, Player::X)] {
        assert!(make_move(cell, player, &mut board));
    }
    assert_eq!(check_winner(&board), Some(Player::X));
    assert!(board.is_complete());
    assert!(!make_move(8, Player::O, &mut board));
}

#[test]
fn test_full_board_draw() {
    let board = Board::from_cells(3, [X, O, X, O, X, O, O, X, O]);
    assert!(board.is_full());
    assert_eq!(board.winner(), None);
    assert!(board.is_complete());
    assert!(available_moves(&board).is_empty());
}

// ============================================================================
// MATCH FLOW
// ============================================================================

#[test]
fn test_classic_match_ends_at_five_board_wins() {
    let (tx, rx) = mpsc::channel();
    let mut engine = engine(BoardAdvance::Rotate);
    engine.subscribe(tx);
    engine.start_new_game(false, AiDifficulty::Normal, GameMode::Classic, TimerDuration::default());

    // X goes for the diagonal on every board, O for the top row
    const X_CELLS: [usize; 3] = [0, 4, 8];
    const O_CELLS: [usize; 6] = [1, 2, 3, 5, 6, 7];

    while engine.game_state() == GameState::Playing {
        let board = engine.current_board().clone();
        let preferred: &[usize] = match engine.current_player() {
            Player::X => &X_CELLS,
            Player::O => &O_CELLS,
        };
        let cell = preferred
            .iter()
            .copied()
            .find(|&c| board.cell(c) == Some(Cell::Empty))
            .unwrap();
        engine.make_move(cell).unwrap();
        assert_consistent(&engine);
    }

    assert_eq!(engine.winner(), Some(Player::X));
    assert_eq!(engine.x_score(), 5);
    assert_eq!(engine.completed_board_indices(), vec![0, 1, 2, 3, 4]);
    // Rotation visits every board before X's fifth win, so the last three
    // carry moves; they are left incomplete rather than untouched
    assert_eq!((5..8).filter(|&i| !engine.board(i).unwrap().is_complete()).count(), 3);

    let events: Vec<MatchEvent> = rx.try_iter().collect();
    assert!(matches!(events.first(), Some(MatchEvent::GameStarted { ai_player: None, .. })));
    assert_eq!(events.last(), Some(&MatchEvent::GameFinished { winner: Some(Player::X) }));
    let completed = events
        .iter()
        .filter(|e| matches!(e, MatchEvent::BoardCompleted { winner: Some(Player::X), .. }))
        .count();
    assert_eq!(completed, 5);
    assert_eq!(engine.stats().games_played, 1);
}

#[test]
fn test_timed_match_goes_to_higher_score() {
    let mut engine = engine(BoardAdvance::Rotate);
    engine.start_new_game(false, AiDifficulty::Normal, GameMode::Timed, TimerDuration::OneMinute);

    play_on(&mut engine, 0, &[0, 3, 1, 4, 2]); // X
    play_on(&mut engine, 1, &[0, 3, 1, 4, 2]); // O
    play_on(&mut engine, 2, &[0, 3, 1, 4, 2]); // X
    play_on(&mut engine, 3, &[0, 3, 1, 4, 2]); // O
    play_on(&mut engine, 4, &[3, 0, 4, 1, 8, 2]); // O
    assert_eq!((engine.x_score(), engine.o_score()), (2, 3));
    assert_consistent(&engine);

    for _ in 0..59 {
        engine.update_timer();
    }
    assert_eq!(engine.game_state(), GameState::Playing);
    assert_eq!(engine.time_remaining(), Some(1));

    engine.update_timer();
    assert_eq!(engine.game_state(), GameState::Finished);
    assert_eq!(engine.winner(), Some(Player::O));
}

#[test]
fn test_complete_board_rejects_moves_until_switched() {
    let mut engine = engine(BoardAdvance::Rotate);
    engine.start_new_game(false, AiDifficulty::Normal, GameMode::Classic, TimerDuration::default());

    play_on(&mut engine, 0, &[0, 3, 1, 4, 2]);
    engine.set_active_board(0).unwrap();
    assert!(engine.is_stalled());
    assert_eq!(engine.make_move(8), Err(MoveError::BoardComplete(0)));
    assert_eq!(engine.set_active_board(8), Err(MoveError::BoardOutOfRange(8)));

    engine.set_active_board(5).unwrap();
    assert!(!engine.is_stalled());
    assert!(engine.make_move(8).is_ok());
}

#[test]
fn test_settings_drive_a_match() {
    let settings = GameSettings {
        game_mode: GameMode::Timed,
        timer_duration: TimerDuration::TwoMinutes,
        ai_delay_ms: 0,
        ..Default::default()
    };
    let mut engine = MatchEngine::new(settings.engine_options(Some(3)));
    engine.start_from_settings(&settings);

    assert_eq!(engine.game_state(), GameState::Playing);
    assert_eq!(engine.time_remaining(), Some(120));
    assert_eq!(engine.ai_player(), None);
}

// ============================================================================
// AI
// ============================================================================

#[test]
fn test_expert_completes_top_row_block() {
    let board = Board::from_cells(0, [X, X, E, E, O, E, E, E, E]);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(AiPlayer::new(AiDifficulty::Expert).get_move(&board, &mut rng), Some(2));
}

/// Drive a match against the AI, acting as host: fire AI tickets, play
/// random human moves and pick the next open board whenever play stalls
fn play_against_ai(mut engine: MatchEngine, seed: u64) -> MatchEngine {
    let ai = engine.ai_player().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let human = AiPlayer::new(AiDifficulty::Normal);

    for _ in 0..300 {
        if engine.game_state() == GameState::Finished {
            break;
        }
        if engine.is_stalled() {
            assert!(engine.pending_ai_move().is_none());
            let from = engine.current_board_index();
            let next = (1..=8)
                .map(|step| (from + step) % 8)
                .find(|&i| !engine.board(i).unwrap().is_complete())
                .unwrap();
            engine.set_active_board(next).unwrap();
        } else if let Some(ticket) = engine.pending_ai_move() {
            assert_eq!(ticket.player, ai);
            engine.run_pending_ai_move(ticket).unwrap();
        } else {
            assert_ne!(engine.current_player(), ai, "AI to move without a pending move");
            let cell = human.get_move(engine.current_board(), &mut rng).unwrap();
            engine.make_move(cell).unwrap();
        }
        assert_consistent(&engine);
    }
    engine
}

#[test]
fn test_ai_opponent_plays_a_whole_match() {
    let mut engine = engine(BoardAdvance::SkipComplete);
    engine.start_new_game(true, AiDifficulty::Hard, GameMode::Classic, TimerDuration::default());
    let engine = play_against_ai(engine, 99);
    assert_eq!(engine.game_state(), GameState::Finished);
}

#[test]
fn test_ai_opponent_survives_stalls_under_rotate() {
    for seed in 0..12 {
        let mut engine = MatchEngine::new(EngineOptions {
            ai_delay: Duration::ZERO,
            seed: Some(seed),
            board_advance: BoardAdvance::Rotate,
        });
        engine.start_new_game(true, AiDifficulty::Hard, GameMode::Classic, TimerDuration::default());
        let engine = play_against_ai(engine, seed);
        assert_eq!(engine.game_state(), GameState::Finished, "seed {}", seed);
    }
}

// ============================================================================
// SERIES
// ============================================================================

#[test]
fn test_series_is_reproducible() {
    let config = SeriesConfig::new(AiDifficulty::Expert, AiDifficulty::Normal, 4)
        .with_seed(17)
        .with_board_advance(BoardAdvance::SkipComplete)
        .sequential();

    let a = play_series(&config, |_| {});
    let b = play_series(&config, |_| {});
    assert_eq!(a.games_played, 4);
    assert_eq!(a.first_wins, b.first_wins);
    assert_eq!(a.second_wins, b.second_wins);
    assert_eq!(a.draws, b.draws);
    assert!(a.outcomes.iter().all(|g| g.outcome.end == MatchEnd::Finished));
}

#[test]
fn test_rotate_policy_can_stall_a_runner() {
    // Drawn or O-won boards eventually put X on a complete board
    let runner = GameRunner::new(AiDifficulty::Normal, AiDifficulty::Normal, BoardAdvance::Rotate, 200);
    let stalled = (0..20)
        .map(|seed| runner.play_match(seed))
        .filter(|o| o.end == MatchEnd::Stalled)
        .count();
    let finished_skip = (0..20)
        .map(|seed| {
            GameRunner::new(AiDifficulty::Normal, AiDifficulty::Normal, BoardAdvance::SkipComplete, 200)
                .play_match(seed)
        })
        .filter(|o| o.end == MatchEnd::Finished)
        .count();
    assert!(stalled > 0);
    assert_eq!(finished_skip, 20);
}
