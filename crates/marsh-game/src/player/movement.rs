//! Movement configuration and constants

use serde::{Deserialize, Serialize};

/// Movement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Forward speed in meters per second
    pub move_speed: f32,
    /// Turn rate in degrees per second at full lateral input
    pub rotation_speed: f32,
    /// Upward velocity change applied when a jump starts
    pub jump_force: f32,
    /// Gravity multiplier while falling
    pub fall_multiplier: f32,
    /// Gravity multiplier while rising with the jump key released
    pub jump_cut_multiplier: f32,
    /// Horizontal velocity factor kept per physics tick without forward input
    pub horizontal_damping: f32,
    /// Vertical speed at or below which ground contact counts as a landing
    pub landing_velocity_threshold: f32,
    /// Input magnitude above which the actor runs
    pub run_deadzone: f32,
    /// Magnitude of world gravity, used to shape the jump arc
    pub gravity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            rotation_speed: 400.0,
            jump_force: 8.0,
            fall_multiplier: 2.5,
            jump_cut_multiplier: 2.0,
            horizontal_damping: 0.9,
            landing_velocity_threshold: 0.1,
            run_deadzone: 0.1,
            gravity: 9.81,
        }
    }
}

/// Which extra gravity applies to an airborne actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityPhase {
    /// Rising with the jump key held: world gravity only
    Rising,
    /// Rising with the jump key released
    JumpCut,
    /// Vertical velocity at or below zero
    Falling,
}

impl MovementConfig {
    /// Classify an airborne tick
    pub fn gravity_phase(&self, vertical_velocity: f32, jump_held: bool) -> GravityPhase {
        if vertical_velocity > 0.0 {
            if jump_held {
                GravityPhase::Rising
            } else {
                GravityPhase::JumpCut
            }
        } else {
            GravityPhase::Falling
        }
    }

    /// Downward acceleration added on top of world gravity
    pub fn extra_gravity(&self, phase: GravityPhase) -> f32 {
        match phase {
            GravityPhase::Rising => 0.0,
            GravityPhase::JumpCut => self.gravity * (self.jump_cut_multiplier - 1.0),
            GravityPhase::Falling => self.gravity * (self.fall_multiplier - 1.0),
        }
    }
}
