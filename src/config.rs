use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::Result;
use tracing::{info, warn};

use crate::types::Handedness;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub game: GameConfig,
    pub detection: DetectionConfig,
    /// Where completed matches are persisted.
    pub scores_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub points_to_win: u32,
    pub countdown_secs: f32,
    pub cooldown_secs: f32,
    /// Restrict the player to one hand ("left"/"right"); unset accepts the
    /// first detected hand.
    pub player_side: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Frames without a confident gesture before the signal degrades.
    pub miss_tolerance_frames: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            points_to_win: 5,
            countdown_secs: 3.0,
            cooldown_secs: 2.0,
            player_side: None,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            miss_tolerance_frames: 30,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            detection: DetectionConfig::default(),
            scores_path: "scores.json".to_string(),
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_PATH: &'static str = "config.json";

    pub fn load(path: &str) -> Result<Self> {
        let config = if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            // Missing fields fall back to defaults via #[serde(default)].
            match serde_json::from_str::<EngineConfig>(&content) {
                Ok(c) => {
                    info!("loaded configuration from {}", path);
                    c
                }
                Err(e) => {
                    warn!("error parsing config: {}. Loading defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("configuration file not found, creating default at {}", path);
            Self::default()
        };

        // Always save back so new fields are populated in the file.
        config.save(path)?;

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Parsed player side, warning once on an unrecognized label.
    pub fn player_side(&self) -> Option<Handedness> {
        let label = self.game.player_side.as_deref()?;
        match Handedness::parse(label) {
            Some(side) => Some(side),
            None => {
                warn!("unrecognized player_side {:?}, accepting any hand", label);
                None
            }
        }
    }
}
