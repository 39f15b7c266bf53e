//! Oscillating platforms and the riders they carry

use std::collections::HashMap;

use glam::{Quat, Vec3};
use marsh_core::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Identifier of the platform a rider stands on
pub type PlatformId = ObjectId;

/// Slack on the end-of-leg comparison so step rounding never adds a tick
const TRAVEL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Travel direction per local axis; any sign or magnitude, clamped to -1/0/1
    pub axis_mask: [i32; 3],
    /// Meters per second along each masked axis
    pub speed: f32,
    /// Distance covered before reversing
    pub travel_distance: f32,
    /// Pause at each end of the travel, in seconds
    pub dwell_time: f32,
    /// Start without moving until a rider arrives
    pub frozen: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            axis_mask: [1, 0, 1],
            speed: 2.0,
            travel_distance: 10.0,
            dwell_time: 1.0,
            frozen: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MovingPlatform {
    id: PlatformId,
    /// Local frame the axis mask is expressed in
    frame: Quat,
    mask: Vec3,
    speed: f32,
    travel_distance: f32,
    dwell_time: f32,
    traveled: f64,
    paused_for: f32,
    paused: bool,
    frozen: bool,
}

impl MovingPlatform {
    pub fn new(id: PlatformId, config: &PlatformConfig, frame: Quat) -> Self {
        let [x, y, z] = config.axis_mask;
        Self {
            id,
            frame,
            mask: Vec3::new(x.signum() as f32, y.signum() as f32, z.signum() as f32),
            speed: config.speed,
            travel_distance: config.travel_distance,
            dwell_time: config.dwell_time,
            traveled: 0.0,
            paused_for: 0.0,
            paused: true,
            frozen: config.frozen,
        }
    }

    pub fn id(&self) -> PlatformId {
        self.id
    }

    /// Current travel direction in the local frame
    pub fn mask(&self) -> Vec3 {
        self.mask
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// A rider arrived: a frozen platform starts moving
    pub fn wake(&mut self) {
        if self.frozen {
            info!("Platform {:?} woken by a rider", self.id.0);
            self.frozen = false;
        }
    }

    /// Advance one tick and return the world-space displacement to apply.
    ///
    /// The tick that ends a leg still moves along the old direction, so each
    /// leg covers `ceil(D / (S * dt))` full steps before the mask flips.
    pub fn tick(&mut self, dt: f32) -> Vec3 {
        if self.frozen {
            return Vec3::ZERO;
        }

        if self.paused {
            self.paused_for += dt;
            if self.paused_for >= self.dwell_time {
                self.paused_for = 0.0;
                self.paused = false;
            }
            return Vec3::ZERO;
        }

        let step = self.speed * dt;
        let delta = self.frame * (self.mask * step);
        self.traveled += f64::from(self.speed) * f64::from(dt);
        if self.traveled + TRAVEL_EPSILON >= f64::from(self.travel_distance) {
            self.traveled = 0.0;
            self.mask = -self.mask;
            self.paused = true;
            debug!("Platform {:?} reversed", self.id.0);
        }
        delta
    }
}

/// Which platform, if any, each rider is standing on
#[derive(Debug, Clone, Default)]
pub struct CarriedBy {
    relations: HashMap<ObjectId, PlatformId>,
}

impl CarriedBy {
    pub fn attach(&mut self, rider: ObjectId, platform: PlatformId) {
        self.relations.insert(rider, platform);
    }

    /// Clear the relation, but only if `rider` is still on `platform`
    pub fn detach(&mut self, rider: ObjectId, platform: PlatformId) {
        if self.relations.get(&rider) == Some(&platform) {
            self.relations.remove(&rider);
        }
    }

    pub fn carried_by(&self, rider: ObjectId) -> Option<PlatformId> {
        self.relations.get(&rider).copied()
    }

    pub fn riders_of(&self, platform: PlatformId) -> impl Iterator<Item = ObjectId> + '_ {
        self.relations
            .iter()
            .filter(move |(_, p)| **p == platform)
            .map(|(rider, _)| *rider)
    }
}
