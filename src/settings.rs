//! Game settings with persistence
//!
//! Settings are saved to `~/.config/marsh/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use marsh_audio::{AudioConfig, VolumeStore};
use marsh_game::GameplayConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub audio: AudioSettings,
    pub levels: LevelSettings,
    pub gameplay: GameplayConfig,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("marsh"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.audio.music = volume.clamp(0.0, 1.0);
    }
}

impl VolumeStore for GameSettings {
    fn store_music_volume(&mut self, volume: f32) {
        self.set_music_volume(volume);
        if let Err(e) = self.save() {
            warn!("Failed to persist music volume: {}", e);
        }
    }
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 to 1.0)
    pub master: f32,
    /// Music volume (0.0 to 1.0)
    pub music: f32,
    /// Sound effects volume (0.0 to 1.0)
    pub sfx: f32,
    /// Background tracks, played in order and wrapped
    pub playlist: Vec<PathBuf>,
    /// Eat cue file
    pub eat_cue: Option<PathBuf>,
    /// Teleport cue file
    pub teleport_cue: Option<PathBuf>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 0.3,
            sfx: 1.0,
            playlist: vec![
                PathBuf::from("assets/music/swamp_theme.ogg"),
                PathBuf::from("assets/music/far_far_away.ogg"),
            ],
            eat_cue: Some(PathBuf::from("assets/sfx/eat.ogg")),
            teleport_cue: Some(PathBuf::from("assets/sfx/teleport.ogg")),
        }
    }
}

impl AudioSettings {
    pub fn engine_config(&self) -> AudioConfig {
        AudioConfig {
            master_volume: self.master as f64,
            music_volume: self.music as f64,
            sfx_volume: self.sfx as f64,
        }
    }
}

/// Where levels live and which one opens the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub dir: PathBuf,
    pub start: String,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("levels"),
            start: "swamp".to_string(),
        }
    }
}
