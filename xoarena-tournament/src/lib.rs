//! XOArena Tournament - headless AI-vs-AI series
//!
//! This crate drives complete matches through the public engine API with a
//! computer player on both sides, for calibrating difficulty tiers:
//! - Single match execution with deterministic seeding
//! - Series play, sequential or parallel, alternating marks
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 2: play_series (phases)
//! - Level 3: GameRunner::play_match (steps)
//! - Level 4: configuration

mod config;
mod game_runner;
mod match_play;

pub use config::{SeriesConfig, DEFAULT_MAX_MOVES};
pub use game_runner::{GameRunner, MatchEnd, MatchOutcome};
pub use match_play::{play_series, SeriesGame, SeriesResult};
