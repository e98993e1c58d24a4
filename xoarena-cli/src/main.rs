//! XOArena CLI - Command-line interface
//!
//! Commands:
//! - play: Interactive match in the terminal
//! - simulate: AI-vs-AI series between two difficulties
//! - settings: Show or create a settings file

mod play;
mod render;
mod settings_cmd;
mod simulate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xoarena")]
#[command(about = "Eight-board tic-tac-toe: first to five boards wins")]
#[command(version)]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a match in the terminal
    Play(play::PlayArgs),
    /// Run an AI-vs-AI series
    Simulate(simulate::SimulateArgs),
    /// Print effective settings or write a default settings file
    Settings(settings_cmd::SettingsArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Simulate(args) => simulate::run(args, cli.seed),
        Commands::Settings(args) => settings_cmd::run(args),
    }
}
