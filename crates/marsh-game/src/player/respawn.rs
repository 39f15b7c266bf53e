//! Return-to-start key with a cooldown

use glam::Vec3;
use marsh_core::Body;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Seconds between two respawns
    pub cooldown: f32,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self { cooldown: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Respawner {
    start_position: Vec3,
    cooldown: f32,
    since_last: f32,
}

impl Respawner {
    /// `start_position` falls back to `spawn` when not configured
    pub fn new(config: &RespawnConfig, start_position: Option<Vec3>, spawn: Vec3) -> Self {
        Self {
            start_position: start_position.unwrap_or(spawn),
            cooldown: config.cooldown.max(0.0),
            // The first press is always accepted
            since_last: config.cooldown.max(0.0),
        }
    }

    pub fn start_position(&self) -> Vec3 {
        self.start_position
    }

    /// Advance the cooldown and respawn on a press. Returns whether the body moved.
    pub fn update(&mut self, pressed: bool, body: &mut dyn Body, dt: f32) -> bool {
        self.since_last += dt;
        if !pressed || self.since_last < self.cooldown {
            return false;
        }

        body.set_position(self.start_position);
        body.set_velocity(Vec3::ZERO);
        self.since_last = 0.0;
        info!("Player respawned at {}", self.start_position);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBody;

    #[test]
    fn test_respawn_resets_body() {
        let spawn = Vec3::new(1.0, 2.0, 3.0);
        let mut respawner = Respawner::new(&RespawnConfig::default(), None, spawn);
        let mut body = TestBody::at(Vec3::new(40.0, -10.0, 0.0));
        body.velocity = Vec3::new(0.0, -20.0, 0.0);

        assert!(respawner.update(true, &mut body, 0.016));
        assert_eq!(body.position, spawn);
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_cooldown_ignores_presses() {
        let mut respawner =
            Respawner::new(&RespawnConfig::default(), Some(Vec3::ZERO), Vec3::ONE);
        assert_eq!(respawner.start_position(), Vec3::ZERO);
        let mut body = TestBody::at(Vec3::ONE);

        assert!(respawner.update(true, &mut body, 0.0));
        body.position = Vec3::splat(5.0);

        assert!(!respawner.update(true, &mut body, 0.5));
        assert_eq!(body.position, Vec3::splat(5.0));

        assert!(!respawner.update(false, &mut body, 0.25));
        assert!(respawner.update(true, &mut body, 0.25));
        assert_eq!(body.position, Vec3::ZERO);
    }
}
