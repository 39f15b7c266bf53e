//! Host services consumed by gameplay code
//!
//! Gameplay components never own physics or animation state. They talk to
//! the host through these traits, which the physics crate implements on top
//! of rapier and tests implement in memory.

use glam::{Quat, Vec3};

use crate::types::{LayerMask, ObjectId};

/// A rigid body the gameplay code may steer.
///
/// Velocity writers must read the full vector, change the components they
/// own, and write it back, so that several writers in one tick compose.
pub trait Body {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn mass(&self) -> f32;

    /// Half of the body's collider height, if it has a collider
    fn half_height(&self) -> Option<f32>;

    /// Instantaneous velocity change, independent of mass
    fn add_velocity_change(&mut self, delta: Vec3) {
        let velocity = self.velocity();
        self.set_velocity(velocity + delta);
    }

    /// Impulse scaled by inverse mass
    fn add_impulse(&mut self, impulse: Vec3) {
        let mass = self.mass();
        if mass > 0.0 {
            self.add_velocity_change(impulse / mass);
        }
    }
}

/// Ray and overlap queries against the collision world
pub trait SpatialQuery {
    /// Cast a ray and return the distance to the first hit on `mask`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
        -> Option<f32>;

    /// All objects on `mask` whose colliders overlap the sphere
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<ObjectId>;
}

/// Animation state machine parameters
pub trait Animator {
    fn set_bool(&mut self, name: &str, value: bool);
}
