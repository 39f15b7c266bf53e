//! Downward ray classifying the actor as grounded or airborne

use glam::Vec3;
use marsh_core::{LayerMask, SpatialQuery};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbeConfig {
    /// Ray length beyond the collider's half height
    pub check_distance: f32,
    /// Layers that count as ground
    pub layer_mask: LayerMask,
    /// Ray origin relative to the body position
    pub origin_offset: Option<Vec3>,
}

impl Default for GroundProbeConfig {
    fn default() -> Self {
        Self {
            check_distance: 0.2,
            layer_mask: LayerMask::GROUND,
            origin_offset: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroundProbe {
    config: GroundProbeConfig,
}

impl GroundProbe {
    pub fn new(config: GroundProbeConfig) -> Self {
        if config.origin_offset.is_none() {
            warn!("No ground check point assigned, probing from the body centre");
        }
        Self { config }
    }

    /// Full ray length for a collider of the given half height
    pub fn ray_length(&self, half_height: Option<f32>) -> f32 {
        self.config.check_distance + half_height.unwrap_or(0.0)
    }

    /// Whether ground lies within reach below `position`. A miss means airborne.
    pub fn check(&self, query: &dyn SpatialQuery, position: Vec3, half_height: Option<f32>) -> bool {
        let origin = position + self.config.origin_offset.unwrap_or(Vec3::ZERO);
        query
            .raycast(
                origin,
                Vec3::NEG_Y,
                self.ray_length(half_height),
                self.config.layer_mask,
            )
            .is_some()
    }
}
