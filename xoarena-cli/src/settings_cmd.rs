//! Settings command - inspect or create a settings file

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use xoarena_core::GameSettings;

#[derive(Args)]
pub struct SettingsArgs {
    /// Settings file to read (defaults are used when absent)
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Write a default settings file and exit
    #[arg(long, value_name = "FILE", conflicts_with = "file")]
    pub init: Option<PathBuf>,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

pub fn run(args: SettingsArgs) -> Result<()> {
    if let Some(path) = &args.init {
        if path.exists() && !args.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        GameSettings::default().save(path)?;
        tracing::info!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let settings = match &args.file {
        Some(path) => GameSettings::load_or_default(path)?,
        None => GameSettings::default(),
    };
    let json = serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
    println!("{}", json);
    Ok(())
}
