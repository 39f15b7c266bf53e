//! In-memory host doubles for gameplay tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Quat, Vec3};
use marsh_core::{Animator, Body, LayerMask, ObjectId, SpatialQuery};

/// A point body integrated with explicit Euler steps
#[derive(Debug, Clone)]
pub struct TestBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub mass: f32,
    pub half_height: Option<f32>,
}

impl TestBody {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            mass: 1.0,
            half_height: Some(0.9),
        }
    }

    /// Apply world gravity and move; stops on a floor at `floor_y`
    pub fn integrate(&mut self, dt: f32, gravity: f32, floor_y: Option<f32>) {
        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;

        if let Some(floor) = floor_y {
            let bottom = floor + self.half_height.unwrap_or(0.0);
            if self.position.y < bottom {
                self.position.y = bottom;
                if self.velocity.y < 0.0 {
                    self.velocity.y = 0.0;
                }
            }
        }
    }
}

impl Body for TestBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn half_height(&self) -> Option<f32> {
        self.half_height
    }
}

/// A flat floor on the ground layer plus spherical items on the item layer
#[derive(Debug, Clone, Default)]
pub struct TestWorld {
    pub floor_y: Option<f32>,
    pub items: Vec<(ObjectId, Vec3, f32)>,
}

impl TestWorld {
    pub fn flat(floor_y: f32) -> Self {
        Self {
            floor_y: Some(floor_y),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, id: ObjectId, position: Vec3, radius: f32) -> Self {
        self.items.push((id, position, radius));
        self
    }
}

impl SpatialQuery for TestWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<f32> {
        let floor = self.floor_y?;
        if !mask.intersects(LayerMask::GROUND) || direction.y >= 0.0 {
            return None;
        }
        let distance = (origin.y - floor) / -direction.y;
        (distance >= 0.0 && distance <= max_distance).then_some(distance)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<ObjectId> {
        if !mask.intersects(LayerMask::ITEMS) {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|(_, position, item_radius)| position.distance(center) <= radius + item_radius)
            .map(|(id, _, _)| *id)
            .collect()
    }
}

/// Animator that records the last value of every parameter
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimator {
    values: Rc<RefCell<HashMap<String, bool>>>,
}

impl RecordingAnimator {
    /// A second handle onto the same recorded values
    pub fn handle(&self) -> Self {
        self.clone()
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.borrow().get(name).copied()
    }
}

impl Animator for RecordingAnimator {
    fn set_bool(&mut self, name: &str, value: bool) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }
}
