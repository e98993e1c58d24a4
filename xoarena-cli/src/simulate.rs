//! Simulate command - AI-vs-AI series between two difficulties
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play with progress, report_results()
//! - Level 3: build_report()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use xoarena_core::{AiDifficulty, BoardAdvance};
use xoarena_tournament::{play_series, MatchEnd, SeriesConfig, SeriesResult, DEFAULT_MAX_MOVES};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Difficulty of the side starting as X
    #[arg(long, default_value = "expert")]
    pub x: AiDifficulty,

    /// Difficulty of the side starting as O
    #[arg(long, default_value = "normal")]
    pub o: AiDifficulty,

    /// Number of matches to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Swap marks every match
    #[arg(long)]
    pub alternate: bool,

    /// Run matches on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Skip boards that are already complete when moving on
    #[arg(long)]
    pub skip_complete: bool,

    /// Maximum moves per match
    #[arg(long, default_value_t = DEFAULT_MAX_MOVES)]
    pub max_moves: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON report of a series
#[derive(Serialize)]
struct SeriesReport {
    generated_at: DateTime<Utc>,
    first: String,
    second: String,
    board_advance: BoardAdvance,
    total_games: u32,
    first_wins: u32,
    second_wins: u32,
    draws: u32,
    stalled: u32,
    aborted: u32,
    x_wins: u32,
    o_wins: u32,
    avg_moves: f32,
    first_win_rate: f32,
    games: Vec<GameReport>,
}

#[derive(Serialize)]
struct GameReport {
    game_number: usize,
    x: String,
    o: String,
    winner: Option<String>,
    end: String,
    x_score: u32,
    o_score: u32,
    draws: u32,
    moves: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Build the series configuration
/// 2. Play every match, ticking a progress bar
/// 3. Report results
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed);

    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(config.games as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} matches ({elapsed_precise})")
                .context("Invalid progress template")?,
        );
        bar
    };

    let result = play_series(&config, |_| progress.inc(1));
    progress.finish_and_clear();

    tracing::info!(
        "Series finished: {} - {} ({} drawn, {} stalled)",
        result.first_wins,
        result.second_wins,
        result.draws,
        result.stalled
    );

    report_results(&result, &config, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &SimulateArgs, seed: Option<u64>) -> SeriesConfig {
    let board_advance = if args.skip_complete {
        BoardAdvance::SkipComplete
    } else {
        BoardAdvance::Rotate
    };

    SeriesConfig {
        first: args.x,
        second: args.o,
        games: args.games,
        alternate_marks: args.alternate,
        seed,
        parallel: args.parallel,
        board_advance,
        max_moves: args.max_moves,
    }
}

fn report_results(result: &SeriesResult, config: &SeriesConfig, json: bool) -> Result<()> {
    if json {
        let report = build_report(result, config, Utc::now());
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print_text_results(result, config);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn build_report(result: &SeriesResult, config: &SeriesConfig, now: DateTime<Utc>) -> SeriesReport {
    let games = result
        .outcomes
        .iter()
        .map(|game| {
            let (x, o) = if game.first_played_x {
                (config.first, config.second)
            } else {
                (config.second, config.first)
            };
            let outcome = &game.outcome;
            GameReport {
                game_number: game.index + 1,
                x: x.to_string(),
                o: o.to_string(),
                winner: outcome.winner.map(|p| p.to_string()),
                end: end_label(outcome.end).to_string(),
                x_score: outcome.x_score,
                o_score: outcome.o_score,
                draws: outcome.draws,
                moves: outcome.moves,
            }
        })
        .collect();

    SeriesReport {
        generated_at: now,
        first: config.first.to_string(),
        second: config.second.to_string(),
        board_advance: config.board_advance,
        total_games: result.games_played,
        first_wins: result.first_wins,
        second_wins: result.second_wins,
        draws: result.draws,
        stalled: result.stalled,
        aborted: result.aborted,
        x_wins: result.x_wins,
        o_wins: result.o_wins,
        avg_moves: result.avg_moves,
        first_win_rate: result.first_win_rate(),
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn end_label(end: MatchEnd) -> &'static str {
    match end {
        MatchEnd::Finished => "finished",
        MatchEnd::Stalled => "stalled",
        MatchEnd::Aborted => "aborted",
    }
}

fn percent(rate: f32) -> f32 {
    rate * 100.0
}

/// Print results as text
fn print_text_results(result: &SeriesResult, config: &SeriesConfig) {
    println!("\n=== Series Results ===");
    println!("{} vs {} ({:?})", config.first, config.second, config.board_advance);
    println!("Total games: {}", result.games_played);
    println!(
        "{:<8} wins: {} ({:.1}%)",
        config.first.to_string(),
        result.first_wins,
        percent(result.first_win_rate())
    );
    println!(
        "{:<8} wins: {} ({:.1}%)",
        config.second.to_string(),
        result.second_wins,
        percent(result.second_win_rate())
    );
    println!(
        "Draws:         {} ({:.1}%)",
        result.draws,
        percent(result.draw_rate())
    );
    println!("X / O wins:    {} / {}", result.x_wins, result.o_wins);
    if result.stalled > 0 {
        println!(
            "Stalled:       {} (active board already complete; try --skip-complete)",
            result.stalled
        );
    }
    if result.aborted > 0 {
        println!("Aborted:       {}", result.aborted);
    }
    println!("Avg moves:     {:.1}", result.avg_moves);
}
