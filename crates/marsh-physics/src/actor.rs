//! Dynamic actor bodies and the `Body` view gameplay code steers

use glam::{Quat, Vec3};
use marsh_core::{Body, LayerMask, ObjectId};
use nalgebra::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

use crate::{groups_for, PhysicsWorld};

/// Capsule actor configuration
#[derive(Debug, Clone)]
pub struct ActorBodyConfig {
    /// Capsule height (default: 1.8m)
    pub height: f32,
    /// Capsule radius (default: 0.4m)
    pub radius: f32,
    /// Collider density; mass follows from the capsule volume
    pub density: f32,
    /// Layer the capsule lives on
    pub layer: LayerMask,
}

impl Default for ActorBodyConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.4,
            density: 1.0,
            layer: LayerMask::PLAYER,
        }
    }
}

impl ActorBodyConfig {
    /// Spawn a rotation-locked dynamic capsule centred at `position`
    pub fn spawn(
        &self,
        physics: &mut PhysicsWorld,
        owner: ObjectId,
        position: Vec3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .lock_rotations()
            .build();

        let half_height = (self.height - 2.0 * self.radius) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height.max(0.01), self.radius)
            .density(self.density)
            .friction(0.0) // Smooth sliding against walls
            .restitution(0.0)
            .collision_groups(groups_for(self.layer))
            .user_data(owner.to_bits())
            .build();

        physics.add_dynamic_body(body, collider)
    }
}

/// Mutable view of one rigid body inside the world
pub struct BodyMut<'w> {
    world: &'w mut PhysicsWorld,
    body: RigidBodyHandle,
    collider: Option<ColliderHandle>,
}

impl<'w> BodyMut<'w> {
    pub fn new(
        world: &'w mut PhysicsWorld,
        body: RigidBodyHandle,
        collider: Option<ColliderHandle>,
    ) -> Self {
        Self {
            world,
            body,
            collider,
        }
    }

    fn rigid_body(&self) -> Option<&RigidBody> {
        self.world.rigid_body_set.get(self.body)
    }

    fn rigid_body_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.rigid_body_set.get_mut(self.body)
    }
}

impl Body for BodyMut<'_> {
    fn position(&self) -> Vec3 {
        self.rigid_body()
            .map(|rb| {
                let t = rb.translation();
                Vec3::new(t.x, t.y, t.z)
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn set_position(&mut self, position: Vec3) {
        if let Some(rb) = self.rigid_body_mut() {
            rb.set_translation(vector![position.x, position.y, position.z], true);
        }
    }

    fn rotation(&self) -> Quat {
        self.rigid_body()
            .map(|rb| {
                let q = rb.rotation();
                Quat::from_xyzw(q.i, q.j, q.k, q.w)
            })
            .unwrap_or(Quat::IDENTITY)
    }

    fn set_rotation(&mut self, rotation: Quat) {
        if let Some(rb) = self.rigid_body_mut() {
            let q = UnitQuaternion::new_normalize(Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            ));
            rb.set_rotation(q, true);
        }
    }

    fn velocity(&self) -> Vec3 {
        self.rigid_body()
            .map(|rb| {
                let v = rb.linvel();
                Vec3::new(v.x, v.y, v.z)
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        if let Some(rb) = self.rigid_body_mut() {
            rb.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    fn mass(&self) -> f32 {
        self.rigid_body().map(|rb| rb.mass()).unwrap_or(0.0)
    }

    fn half_height(&self) -> Option<f32> {
        let collider = self.world.collider_set.get(self.collider?)?;
        Some(collider.compute_aabb().half_extents().y)
    }
}
