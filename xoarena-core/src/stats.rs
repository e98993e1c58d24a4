//! Lifetime match statistics

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::Player;

/// Totals across finished matches
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub games_played: u32,
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
    /// Mark that won the most recent run of matches
    pub streak_holder: Option<Player>,
    pub current_streak: u32,
    pub longest_win_streak: u32,
}

impl GameStats {
    /// Record one finished match. A draw breaks the running streak.
    pub fn record(&mut self, winner: Option<Player>) {
        self.games_played += 1;

        match winner {
            Some(Player::X) => self.x_wins += 1,
            Some(Player::O) => self.o_wins += 1,
            None => self.draws += 1,
        }

        match winner {
            Some(player) if self.streak_holder == Some(player) => self.current_streak += 1,
            Some(player) => {
                self.streak_holder = Some(player);
                self.current_streak = 1;
            }
            None => {
                self.streak_holder = None;
                self.current_streak = 0;
            }
        }
        self.longest_win_streak = self.longest_win_streak.max(self.current_streak);
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stats: {}", path.display()))?;
        let stats = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stats: {}", path.display()))?;
        Ok(stats)
    }

    /// Load, or start from zero when the file does not exist yet
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write stats: {}", path.display()))?;
        Ok(())
    }
}
