//! Play command - interactive match in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_settings(), session()
//! - Level 3: apply_command(), flush_events()
//! - Level 4: command parsing and messages
//!
//! Input, the one-second timer and delayed computer moves all arrive in a
//! single `select!` on a current-thread runtime, so the engine is only ever
//! touched from one place.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use xoarena_core::{
    AiDifficulty, AiMoveTicket, BoardAdvance, GameMode, GameSettings, GameState, GameStats,
    MatchEngine, MatchEvent, MoveError, TimerDuration, BOARD_COUNT,
};

use crate::render::{describe_event, render_match};

const TICK: Duration = Duration::from_secs(1);

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Play against the computer
    #[arg(long)]
    pub ai: bool,

    /// Computer difficulty (normal, hard, expert)
    #[arg(long)]
    pub difficulty: Option<AiDifficulty>,

    /// Game mode (classic, timed)
    #[arg(long)]
    pub mode: Option<GameMode>,

    /// Timer length in seconds (60, 120, 180, 300); implies timed mode
    #[arg(long, value_name = "SECONDS")]
    pub timer: Option<TimerDuration>,

    /// Settings JSON file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Statistics JSON file, updated after every match
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Skip boards that are already complete when moving on
    #[arg(long)]
    pub skip_complete: bool,
}

/// A line typed by the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    /// Cell index 0-8 on the active board
    Move(usize),
    /// Board index 0-7
    Board(usize),
    Pause,
    Resume,
    New,
    Show,
    Help,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let stats = match &args.stats {
        Some(path) => GameStats::load_or_default(path)?,
        None => GameStats::default(),
    };

    let (tx, rx) = mpsc::channel();
    let mut engine = MatchEngine::new(settings.engine_options(seed)).with_stats(stats);
    engine.subscribe(tx);
    engine.start_from_settings(&settings);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(session(&mut engine, &rx, args.stats.as_deref()))?;

    let stats = engine.stats();
    tracing::info!(
        "Session over: {} played, X {} - O {}, {} drawn",
        stats.games_played,
        stats.x_wins,
        stats.o_wins,
        stats.draws
    );
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Settings file (or defaults) with command-line flags applied on top
fn resolve_settings(args: &PlayArgs) -> Result<GameSettings> {
    let mut settings = match &args.settings {
        Some(path) => GameSettings::load_or_default(path)?,
        None => GameSettings::default(),
    };

    if args.ai {
        settings.ai_enabled = true;
    }
    if let Some(difficulty) = args.difficulty {
        settings.ai_difficulty = difficulty;
    }
    if let Some(timer) = args.timer {
        settings.timer_duration = timer;
        settings.game_mode = GameMode::Timed;
    }
    if let Some(mode) = args.mode {
        settings.game_mode = mode;
    }
    if args.skip_complete {
        settings.board_advance = BoardAdvance::SkipComplete;
    }
    Ok(settings)
}

/// Event loop until the player quits or stdin closes
async fn session(
    engine: &mut MatchEngine,
    events: &Receiver<MatchEvent>,
    stats_path: Option<&Path>,
) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ai_due: Option<(AiMoveTicket, Instant)> = None;
    let mut redraw = true;

    print_help();

    loop {
        flush_events(events, engine, stats_path)?;
        if redraw {
            println!("{}", render_match(engine));
            if engine.is_stalled() {
                println!(
                    "Board {} is already complete. Pick another one with `b <1-{}>`.",
                    engine.current_board_index() + 1,
                    BOARD_COUNT
                );
            }
        }
        redraw = false;

        // Keep the deadline of a ticket we have already seen
        ai_due = match (engine.pending_ai_move(), ai_due) {
            (Some(ticket), Some((seen, due))) if seen == ticket => Some((ticket, due)),
            (Some(ticket), _) => Some((ticket, Instant::now() + ticket.delay)),
            (None, _) => None,
        };
        let ai_ready = ai_due.is_some() && engine.game_state() == GameState::Playing;
        let ai_deadline = ai_due.map_or_else(Instant::now, |(_, due)| due);

        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => redraw = apply_command(engine, command, &mut ticker),
                    Err(msg) => println!("{}", msg),
                }
            }
            _ = ticker.tick() => engine.update_timer(),
            _ = time::sleep_until(ai_deadline), if ai_ready => {
                if let Some((ticket, _)) = ai_due.take() {
                    match engine.run_pending_ai_move(ticket) {
                        Ok(_) => redraw = true,
                        Err(e) => tracing::warn!("Computer move skipped: {}", e),
                    }
                }
            }
        }
    }

    flush_events(events, engine, stats_path)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Apply one player command. Returns true when the boards should be redrawn.
fn apply_command(engine: &mut MatchEngine, command: Command, ticker: &mut Interval) -> bool {
    match command {
        Command::Move(cell) => {
            let ai_to_move = engine.game_state() == GameState::Playing
                && engine.ai_player() == Some(engine.current_player());
            if ai_to_move {
                println!("Wait for the computer to move.");
                return false;
            }
            report(engine.make_move(cell).map(|_| ()))
        }
        Command::Board(index) => report(engine.set_active_board(index)),
        Command::Pause => {
            if !engine.pause_game() {
                println!("Nothing to pause.");
            }
            false
        }
        Command::Resume => {
            if engine.resume_game() {
                ticker.reset();
                true
            } else {
                println!("The match is not paused.");
                false
            }
        }
        Command::New => {
            engine.reset_game();
            ticker.reset();
            true
        }
        Command::Show => true,
        Command::Help => {
            print_help();
            false
        }
        Command::Quit => false,
    }
}

/// Print pending engine events and persist stats when a match ends
fn flush_events(
    events: &Receiver<MatchEvent>,
    engine: &MatchEngine,
    stats_path: Option<&Path>,
) -> Result<()> {
    for event in events.try_iter() {
        if let Some(text) = describe_event(&event) {
            println!("{}", text);
        }
        if let (MatchEvent::GameFinished { .. }, Some(path)) = (&event, stats_path) {
            engine.stats().save(path)?;
            tracing::debug!("Saved stats to {}", path.display());
        }
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_command(input: &str) -> Result<Command, String> {
    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Command::Show);
    };

    let command = match first.to_ascii_lowercase().as_str() {
        "p" | "pause" => Command::Pause,
        "r" | "resume" => Command::Resume,
        "n" | "new" => Command::New,
        "s" | "show" => Command::Show,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "b" | "board" => {
            let number = words
                .next()
                .ok_or_else(|| format!("Which board? Use `b <1-{}>`.", BOARD_COUNT))?;
            Command::Board(parse_number(number, BOARD_COUNT)?)
        }
        other => Command::Move(parse_number(other, 9)?),
    };

    if words.next().is_some() {
        return Err(format!("Unexpected input: {:?}", input.trim()));
    }
    Ok(command)
}

/// Parse a 1-based number into a 0-based index
fn parse_number(text: &str, max: usize) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n - 1),
        _ => Err(format!("Expected a number from 1 to {}, got {:?}. Type h for help.", max, text)),
    }
}

/// Print a rejected move in player terms; true when the move went through
fn report(result: Result<(), MoveError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            println!("{}", explain(&e));
            false
        }
    }
}

fn explain(error: &MoveError) -> String {
    match error {
        MoveError::CellOccupied { cell, .. } => format!("Cell {} is already taken.", cell + 1),
        MoveError::BoardComplete(board) => format!("Board {} is already complete.", board + 1),
        MoveError::Paused => "The match is paused. Type r to resume.".to_string(),
        MoveError::NotPlaying(GameState::Finished) => {
            "The match is over. Type n for a new one.".to_string()
        }
        other => other.to_string(),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  1-9        play that cell on the active board");
    println!("  b <1-{}>    switch to another board", BOARD_COUNT);
    println!("  p / r      pause / resume");
    println!("  n          restart the match");
    println!("  s          show the boards");
    println!("  q          quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use xoarena_core::{EngineOptions, Player};

    fn args() -> PlayArgs {
        PlayArgs {
            ai: false,
            difficulty: None,
            mode: None,
            timer: None,
            settings: None,
            stats: None,
            skip_complete: false,
        }
    }

    fn two_player_engine() -> MatchEngine {
        let mut engine = MatchEngine::new(EngineOptions {
            ai_delay: Duration::ZERO,
            seed: Some(5),
            ..Default::default()
        });
        engine.start_new_game(false, AiDifficulty::Normal, GameMode::Classic, TimerDuration::default());
        engine
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("5"), Ok(Command::Move(4)));
        assert_eq!(parse_command(" 1 "), Ok(Command::Move(0)));
        assert_eq!(parse_command("b 8"), Ok(Command::Board(7)));
        assert_eq!(parse_command("Board 2"), Ok(Command::Board(1)));
        assert_eq!(parse_command("P"), Ok(Command::Pause));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command(""), Ok(Command::Show));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("0").is_err());
        assert!(parse_command("10").is_err());
        assert!(parse_command("b 9").is_err());
        assert!(parse_command("b").is_err());
        assert!(parse_command("5 6").is_err());
        assert!(parse_command("xyz").is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let mut a = args();
        a.ai = true;
        a.difficulty = Some(AiDifficulty::Expert);
        a.timer = Some(TimerDuration::OneMinute);
        a.skip_complete = true;

        let settings = resolve_settings(&a).unwrap();
        assert!(settings.ai_enabled);
        assert_eq!(settings.ai_difficulty, AiDifficulty::Expert);
        assert_eq!(settings.game_mode, GameMode::Timed);
        assert_eq!(settings.timer_duration, TimerDuration::OneMinute);
        assert_eq!(settings.board_advance, BoardAdvance::SkipComplete);
    }

    #[test]
    fn test_explicit_mode_wins_over_timer() {
        let mut a = args();
        a.timer = Some(TimerDuration::TwoMinutes);
        a.mode = Some(GameMode::Classic);
        let settings = resolve_settings(&a).unwrap();
        assert_eq!(settings.game_mode, GameMode::Classic);
        assert_eq!(settings.timer_duration, TimerDuration::TwoMinutes);
    }

    #[test]
    fn test_explain_uses_player_numbering() {
        let text = explain(&MoveError::CellOccupied { board: 0, cell: 4 });
        assert_eq!(text, "Cell 5 is already taken.");
        assert_eq!(explain(&MoveError::BoardComplete(2)), "Board 3 is already complete.");
    }

    #[tokio::test]
    async fn test_apply_command_moves_and_pauses() {
        let mut engine = two_player_engine();
        let mut ticker = time::interval(TICK);

        assert!(apply_command(&mut engine, Command::Move(4), &mut ticker));
        assert_eq!(engine.current_player(), Player::O);
        // same cell on the new active board is free
        assert!(apply_command(&mut engine, Command::Move(4), &mut ticker));

        assert!(!apply_command(&mut engine, Command::Pause, &mut ticker));
        assert!(engine.is_paused());
        assert!(!apply_command(&mut engine, Command::Move(0), &mut ticker));
        assert!(apply_command(&mut engine, Command::Resume, &mut ticker));
        assert_eq!(engine.game_state(), GameState::Playing);
    }

    #[tokio::test]
    async fn test_new_command_restarts() {
        let mut engine = two_player_engine();
        let mut ticker = time::interval(TICK);

        apply_command(&mut engine, Command::Move(0), &mut ticker);
        assert!(apply_command(&mut engine, Command::New, &mut ticker));
        assert_eq!(engine.move_count(), 0);
        assert_eq!(engine.current_board_index(), 0);
        assert_eq!(engine.current_player(), Player::X);
    }

    #[test]
    fn test_flush_events_saves_stats_on_finish() {
        let dir = std::env::temp_dir().join(format!("xoarena-play-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stats.json");

        let (tx, rx) = mpsc::channel();
        let mut engine = MatchEngine::new(EngineOptions {
            ai_delay: Duration::ZERO,
            seed: Some(2),
            ..Default::default()
        });
        engine.subscribe(tx);
        engine.start_new_game(false, AiDifficulty::Normal, GameMode::Timed, TimerDuration::OneMinute);
        for _ in 0..60 {
            engine.update_timer();
        }
        assert_eq!(engine.game_state(), GameState::Finished);

        flush_events(&rx, &engine, Some(&path)).unwrap();
        let saved = GameStats::load(&path).unwrap();
        assert_eq!(saved.games_played, 1);
        assert_eq!(saved.draws, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
