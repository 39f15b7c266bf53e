//! Small scene props: spinning food, bounce mushrooms, and the companion

use std::collections::HashSet;

use glam::{Quat, Vec3};
use marsh_core::{Body, ObjectId, Transform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Constant roll of a food item around its local Z axis
#[derive(Debug, Clone, Copy)]
pub struct SpinningFood {
    /// Degrees per second
    spin_speed: f32,
}

impl SpinningFood {
    /// Start at a random roll in `[0, 360)` degrees
    pub fn new(spin_speed: f32, transform: &mut Transform) -> Self {
        let roll = rand::thread_rng().gen_range(0.0..360.0);
        Self::with_roll(spin_speed, roll, transform)
    }

    pub fn with_roll(spin_speed: f32, roll: f32, transform: &mut Transform) -> Self {
        transform.rotate_roll(roll);
        Self { spin_speed }
    }

    pub fn tick(&self, transform: &mut Transform, dt: f32) {
        transform.rotate_roll(self.spin_speed * dt);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BouncePadConfig {
    /// Upward impulse given to a body on the pad
    pub repel_force: f32,
}

impl Default for BouncePadConfig {
    fn default() -> Self {
        Self { repel_force: 10.0 }
    }
}

/// Trigger that launches bodies upward once per visit
#[derive(Debug, Clone)]
pub struct BouncePad {
    id: ObjectId,
    config: BouncePadConfig,
    inside: HashSet<ObjectId>,
    bounced: HashSet<ObjectId>,
}

impl BouncePad {
    pub fn new(id: ObjectId, config: BouncePadConfig) -> Self {
        Self {
            id,
            config,
            inside: HashSet::new(),
            bounced: HashSet::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn on_trigger_enter(&mut self, other: ObjectId) {
        self.inside.insert(other);
    }

    /// Leaving the pad re-arms the body
    pub fn on_trigger_exit(&mut self, other: ObjectId) {
        self.inside.remove(&other);
        self.bounced.remove(&other);
    }

    /// Bodies currently on the pad
    pub fn occupants(&self) -> Vec<ObjectId> {
        self.inside.iter().copied().collect()
    }

    /// Physics tick for one occupant. Returns whether it was launched.
    pub fn on_trigger_stay(&mut self, other: ObjectId, body: &mut dyn Body) -> bool {
        if !self.inside.contains(&other) || self.bounced.contains(&other) {
            return false;
        }

        let mut velocity = body.velocity();
        velocity.y = 0.0;
        body.set_velocity(velocity);
        body.add_impulse(Vec3::Y * self.config.repel_force);
        self.bounced.insert(other);
        debug!("Bounced {:?} with force {}", other.0, self.config.repel_force);
        true
    }
}

/// A follower that latches onto the player on first contact
#[derive(Debug, Clone)]
pub struct Companion {
    id: ObjectId,
    pub transform: Transform,
    /// Offset in the player's local frame, set on attach
    local_offset: Option<Vec3>,
}

impl Companion {
    pub fn new(id: ObjectId, position: Vec3) -> Self {
        Self {
            id,
            transform: Transform::from_position(position),
            local_offset: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn attached_to_player(&self) -> bool {
        self.local_offset.is_some()
    }

    /// The player touched the companion's sensor
    pub fn on_player_enter(&mut self, player_position: Vec3, player_rotation: Quat) {
        if self.attached_to_player() {
            return;
        }
        let offset = player_rotation.inverse() * (self.transform.position - player_position);
        self.local_offset = Some(offset);
        info!("Companion attached to the player");
    }

    /// Keep the attached offset relative to the player
    pub fn follow(&mut self, player_position: Vec3, player_rotation: Quat) {
        if let Some(offset) = self.local_offset {
            self.transform.position = player_position + player_rotation * offset;
            self.transform.rotation = player_rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBody;

    #[test]
    fn test_food_spins_at_constant_rate() {
        let mut transform = Transform::default();
        let food = SpinningFood::with_roll(90.0, 30.0, &mut transform);
        food.tick(&mut transform, 0.5);

        let expected = Quat::from_rotation_z(75f32.to_radians());
        assert!(transform.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_random_roll_keeps_axis() {
        let mut transform = Transform::default();
        SpinningFood::new(0.0, &mut transform);
        let (axis, _) = transform.rotation.to_axis_angle();
        assert!(axis.z.abs() > 0.999 || transform.rotation.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_bounce_once_per_visit() {
        let mut pad = BouncePad::new(ObjectId::new(), BouncePadConfig { repel_force: 10.0 });
        let player = ObjectId::new();
        let mut body = TestBody::at(Vec3::ZERO);
        body.mass = 2.0;
        body.velocity = Vec3::new(1.0, -4.0, 0.0);

        pad.on_trigger_enter(player);
        assert!(pad.on_trigger_stay(player, &mut body));
        assert_eq!(body.velocity, Vec3::new(1.0, 5.0, 0.0));

        body.velocity.y = -1.0;
        assert!(!pad.on_trigger_stay(player, &mut body));
        assert_eq!(body.velocity.y, -1.0);

        pad.on_trigger_exit(player);
        assert!(!pad.on_trigger_stay(player, &mut body));
        pad.on_trigger_enter(player);
        assert!(pad.on_trigger_stay(player, &mut body));
    }

    #[test]
    fn test_companion_keeps_local_offset() {
        let mut companion = Companion::new(ObjectId::new(), Vec3::new(1.0, 0.0, 0.0));
        companion.follow(Vec3::splat(9.0), Quat::IDENTITY);
        assert_eq!(companion.transform.position, Vec3::new(1.0, 0.0, 0.0));

        companion.on_player_enter(Vec3::ZERO, Quat::IDENTITY);
        assert!(companion.attached_to_player());

        let turned = Quat::from_rotation_y(std::f32::consts::PI);
        companion.follow(Vec3::new(0.0, 0.0, 5.0), turned);
        assert!((companion.transform.position - Vec3::new(-1.0, 0.0, 5.0)).length() < 1e-5);

        // A second contact does not move the anchor
        companion.on_player_enter(Vec3::new(50.0, 0.0, 0.0), Quat::IDENTITY);
        companion.follow(Vec3::ZERO, Quat::IDENTITY);
        assert!((companion.transform.position - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }
}
