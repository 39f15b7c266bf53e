//! Level descriptions loaded from TOML
//!
//! A level lists the player spawn, static geometry, and every gameplay
//! object. Tags are resolved into [`ObjectTag`] here so the scene never
//! compares strings.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors raised while reading a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid level '{level}': {reason}")]
    Invalid { level: String, reason: String },
}

/// Category of a pickup-layer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectTag {
    /// Consumable, counts towards the teleport unlock
    Food,
    /// Decoration that lives on the item layer but is never eaten
    Prop,
}

fn default_spin_speed() -> f32 {
    90.0
}

fn default_item_radius() -> f32 {
    0.5
}

fn default_axis_mask() -> [i32; 3] {
    [1, 0, 1]
}

fn default_platform_speed() -> f32 {
    2.0
}

fn default_travel_distance() -> f32 {
    10.0
}

fn default_dwell_time() -> f32 {
    1.0
}

fn default_repel_force() -> f32 {
    10.0
}

fn default_companion_radius() -> f32 {
    1.0
}

fn default_density() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDesc {
    pub spawn: Vec3,
    /// Respawn point; the spawn point is used when absent
    #[serde(default)]
    pub respawn: Option<Vec3>,
    /// Initial facing around the up axis, in degrees
    #[serde(default)]
    pub yaw: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxDesc {
    pub position: Vec3,
    pub half_extents: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDesc {
    pub tag: ObjectTag,
    pub position: Vec3,
    #[serde(default = "default_item_radius")]
    pub radius: f32,
    /// Roll speed in degrees per second (food only)
    #[serde(default = "default_spin_speed")]
    pub spin_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDesc {
    pub position: Vec3,
    pub half_extents: Vec3,
    #[serde(default = "default_axis_mask")]
    pub axis_mask: [i32; 3],
    #[serde(default = "default_platform_speed")]
    pub speed: f32,
    #[serde(default = "default_travel_distance")]
    pub travel_distance: f32,
    #[serde(default = "default_dwell_time")]
    pub dwell_time: f32,
    /// Local frame rotation around the up axis, in degrees
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub frozen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDesc {
    pub position: Vec3,
    pub half_extents: Vec3,
    pub target_scene: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BouncePadDesc {
    pub position: Vec3,
    pub half_extents: Vec3,
    #[serde(default = "default_repel_force")]
    pub repel_force: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionDesc {
    pub position: Vec3,
    #[serde(default = "default_companion_radius")]
    pub radius: f32,
}

/// A loose dynamic box that platforms carry and pads launch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LooseBodyDesc {
    pub position: Vec3,
    pub half_extents: Vec3,
    #[serde(default = "default_density")]
    pub density: f32,
}

/// A complete level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDesc {
    pub name: String,
    pub player: PlayerDesc,
    /// Height of the infinite ground plane, if any
    #[serde(default)]
    pub ground_height: Option<f32>,
    #[serde(default)]
    pub ground: Vec<BoxDesc>,
    #[serde(default)]
    pub items: Vec<ItemDesc>,
    #[serde(default)]
    pub platforms: Vec<PlatformDesc>,
    #[serde(default)]
    pub gates: Vec<GateDesc>,
    #[serde(default)]
    pub bounce_pads: Vec<BouncePadDesc>,
    #[serde(default)]
    pub companions: Vec<CompanionDesc>,
    #[serde(default)]
    pub loose_bodies: Vec<LooseBodyDesc>,
}

impl LevelDesc {
    /// Parse and validate a level from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, LevelError> {
        let level: LevelDesc = toml::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Read a level file from disk
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_toml_str(&text)?;
        info!(
            "Loaded level '{}' ({} items, {} platforms, {} gates)",
            level.name,
            level.items.len(),
            level.platforms.len(),
            level.gates.len()
        );
        Ok(level)
    }

    /// Path of the level file for a scene name inside `dir`
    pub fn path_for(dir: &Path, scene: &str) -> PathBuf {
        dir.join(format!("{scene}.toml"))
    }

    /// Number of food items, the teleport unlock target
    pub fn food_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.tag == ObjectTag::Food)
            .count()
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::Invalid {
            level: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("level name is empty".into()));
        }
        for (i, platform) in self.platforms.iter().enumerate() {
            if platform.travel_distance <= 0.0 {
                return Err(invalid(format!("platform {i} has no travel distance")));
            }
            if platform.speed < 0.0 || platform.dwell_time < 0.0 {
                return Err(invalid(format!("platform {i} has a negative speed or dwell time")));
            }
        }
        for (i, gate) in self.gates.iter().enumerate() {
            if gate.target_scene.trim().is_empty() {
                return Err(invalid(format!("gate {i} has no target scene")));
            }
        }
        if let Some(body) = self.loose_bodies.iter().find(|b| b.density <= 0.0) {
            return Err(invalid(format!("loose body at {} has a non-positive density", body.position)));
        }
        if let Some(item) = self.items.iter().find(|item| item.radius <= 0.0) {
            return Err(invalid(format!("item at {} has a non-positive radius", item.position)));
        }
        Ok(())
    }
}
