//! Player-facing settings
//!
//! The engine only reads the match-related fields when a game starts. Sound,
//! haptic and display flags are carried for the presentation layer.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::ai::AiDifficulty;
use crate::game::{BoardAdvance, EngineOptions, GameMode, TimerDuration};

/// Default pause before the AI answers, in milliseconds
pub const DEFAULT_AI_DELAY_MS: u64 = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub ai_enabled: bool,
    pub ai_difficulty: AiDifficulty,
    pub game_mode: GameMode,
    pub timer_duration: TimerDuration,
    pub ai_delay_ms: u64,
    pub board_advance: BoardAdvance,
    pub sound_enabled: bool,
    pub haptic_enabled: bool,
    pub tutorial_shown: bool,
    pub high_contrast_mode: bool,
    pub reduce_motion: bool,
    pub auto_save_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            ai_enabled: false,
            ai_difficulty: AiDifficulty::Normal,
            game_mode: GameMode::Classic,
            timer_duration: TimerDuration::ThreeMinutes,
            ai_delay_ms: DEFAULT_AI_DELAY_MS,
            board_advance: BoardAdvance::Rotate,
            sound_enabled: true,
            haptic_enabled: true,
            tutorial_shown: false,
            high_contrast_mode: false,
            reduce_motion: false,
            auto_save_enabled: true,
        }
    }
}

impl GameSettings {
    /// Engine construction options derived from these settings
    pub fn engine_options(&self, seed: Option<u64>) -> EngineOptions {
        EngineOptions {
            ai_delay: Duration::from_millis(self.ai_delay_ms),
            seed,
            board_advance: self.board_advance,
        }
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        Ok(settings)
    }

    /// Load, or use defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{"ai_enabled": true, "ai_difficulty": "Expert", "timer_duration": 60}"#;
        let settings: GameSettings = serde_json::from_str(json).unwrap();
        assert!(settings.ai_enabled);
        assert_eq!(settings.ai_difficulty, AiDifficulty::Expert);
        assert_eq!(settings.timer_duration, TimerDuration::OneMinute);
        assert_eq!(settings.game_mode, GameMode::Classic);
        assert_eq!(settings.ai_delay_ms, DEFAULT_AI_DELAY_MS);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn test_rejects_unsupported_timer() {
        let json = r#"{"timer_duration": 45}"#;
        assert!(serde_json::from_str::<GameSettings>(json).is_err());
    }

    #[test]
    fn test_engine_options() {
        let settings = GameSettings {
            ai_delay_ms: 0,
            board_advance: BoardAdvance::SkipComplete,
            ..Default::default()
        };
        let options = settings.engine_options(Some(9));
        assert_eq!(options.ai_delay, Duration::ZERO);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.board_advance, BoardAdvance::SkipComplete);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("xoarena-settings-{}.json", std::process::id()));
        let settings = GameSettings {
            ai_enabled: true,
            game_mode: GameMode::Timed,
            timer_duration: TimerDuration::FiveMinutes,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = GameSettings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }
}
