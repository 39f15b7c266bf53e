//! Marsh Physics - Physics simulation using rapier3d
//!
//! Provides rigid bodies, sensors, layer-filtered spatial queries, and
//! sensor enter/exit reporting for the gameplay layer.

mod actor;
mod sensors;

pub use actor::{ActorBodyConfig, BodyMut};
pub use sensors::SensorEvent;

use glam::{Quat, Vec3};
use marsh_core::{LayerMask, ObjectId, SpatialQuery};
use nalgebra::Unit;
use rapier3d::prelude::*;

use crate::sensors::SensorTracker;

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/60)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

/// Interaction groups for a collider living on `layer` and colliding with everything
pub fn groups_for(layer: LayerMask) -> InteractionGroups {
    InteractionGroups::new(Group::from_bits_truncate(layer.0), Group::ALL)
}

/// Query filter that only accepts colliders on `mask`
fn filter_for(mask: LayerMask) -> QueryFilter<'static> {
    QueryFilter::default().groups(InteractionGroups::new(
        Group::ALL,
        Group::from_bits_truncate(mask.0),
    ))
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Impulse joint storage
    pub impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    pub multibody_joint_set: MultibodyJointSet,

    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Physics pipeline
    physics_pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,
    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,
    /// Continuous collision detection solver
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,
    /// Sensor overlap bookkeeping
    sensors: SensorTracker,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            sensors: SensorTracker::default(),
        }
    }

    /// Step the physics simulation and collect sensor transitions
    pub fn step(&mut self) {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // Update query pipeline after physics step
        self.query_pipeline.update(&self.collider_set);

        self.sensors.refresh(&self.narrow_phase, &self.collider_set);
    }

    /// Rebuild the query acceleration structure without stepping
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Sensor enter/exit transitions observed since the last call
    pub fn drain_sensor_events(&mut self) -> Vec<SensorEvent> {
        self.sensors.drain()
    }

    /// Add a static collider (ground, walls, etc.)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Add a dynamic rigid body with a collider
    pub fn add_dynamic_body(
        &mut self,
        rigid_body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rb_handle = self.rigid_body_set.insert(rigid_body);
        let col_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        (rb_handle, col_handle)
    }

    /// Add a kinematic rigid body with a collider
    pub fn add_kinematic_body(
        &mut self,
        rigid_body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rb_handle = self.rigid_body_set.insert(rigid_body);
        let col_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        (rb_handle, col_handle)
    }

    /// Attach an extra collider (typically a sensor) to an existing body
    pub fn attach_collider(&mut self, body: RigidBodyHandle, collider: Collider) -> ColliderHandle {
        let handle = self
            .collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set);
        if self.collider_set.get(handle).is_some_and(|c| c.is_sensor()) {
            self.sensors.watch(handle);
        }
        handle
    }

    /// Add a free-standing box sensor owned by `owner` on the trigger layer
    pub fn add_box_sensor(
        &mut self,
        owner: ObjectId,
        half_extents: Vec3,
        position: Vec3,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .sensor(true)
            .collision_groups(groups_for(LayerMask::TRIGGERS))
            .user_data(owner.to_bits())
            .build();
        let handle = self.add_static_collider(collider);
        self.sensors.watch(handle);
        handle
    }

    /// Add a free-standing ball sensor owned by `owner` on `layer`
    pub fn add_ball_sensor(
        &mut self,
        owner: ObjectId,
        radius: f32,
        position: Vec3,
        layer: LayerMask,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .translation(vector![position.x, position.y, position.z])
            .sensor(true)
            .collision_groups(groups_for(layer))
            .user_data(owner.to_bits())
            .build();
        let handle = self.add_static_collider(collider);
        self.sensors.watch(handle);
        handle
    }

    /// Remove a collider
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.sensors.forget(handle);
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true);
    }

    /// World position of a rigid body
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|rb| {
            let t = rb.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    /// World rotation of a rigid body
    pub fn body_rotation(&self, handle: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set.get(handle).map(|rb| {
            let q = rb.rotation();
            Quat::from_xyzw(q.i, q.j, q.k, q.w)
        })
    }

    /// Half of a collider's world-space AABB height
    pub fn collider_half_height(&self, handle: ColliderHandle) -> Option<f32> {
        self.collider_set
            .get(handle)
            .map(|collider| collider.compute_aabb().half_extents().y)
    }

    /// Schedule a kinematic body to move by `delta` during the next step
    pub fn move_kinematic(&mut self, handle: RigidBodyHandle, delta: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let next = body.translation() + vector![delta.x, delta.y, delta.z];
            body.set_next_kinematic_translation(next);
        }
    }

    /// Cast a ray and return the first hit
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<(ColliderHandle, f32)> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray(&self.rigid_body_set, &self.collider_set, &ray, max_distance, true, filter)
    }

    /// Create a ground plane collider on the ground layer
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .collision_groups(groups_for(LayerMask::GROUND))
            .build();
        self.add_static_collider(ground)
    }

    /// Create a static box collider on the ground layer
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .collision_groups(groups_for(LayerMask::GROUND))
            .build();
        self.add_static_collider(collider)
    }

    /// A free dynamic box on the default layer, owned by `owner`
    pub fn create_dynamic_box(
        &mut self,
        owner: ObjectId,
        half_extents: Vec3,
        position: Vec3,
        density: f32,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .density(density)
            .friction(0.7)
            .collision_groups(groups_for(LayerMask::DEFAULT))
            .user_data(owner.to_bits())
            .build();
        self.add_dynamic_body(body, collider)
    }

    /// Create a kinematic box platform on the ground layer, with a rider sensor on top
    pub fn create_kinematic_platform(
        &mut self,
        owner: ObjectId,
        half_extents: Vec3,
        position: Vec3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let solid = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(0.7)
            .collision_groups(groups_for(LayerMask::GROUND))
            .user_data(owner.to_bits())
            .build();
        let (body_handle, _) = self.add_kinematic_body(body, solid);

        // Thin slab just above the surface catches anything standing on it
        let rider_sensor = ColliderBuilder::cuboid(half_extents.x, 0.25, half_extents.z)
            .translation(vector![0.0, half_extents.y + 0.25, 0.0])
            .sensor(true)
            .collision_groups(groups_for(LayerMask::TRIGGERS))
            .user_data(owner.to_bits())
            .build();
        let sensor_handle = self.attach_collider(body_handle, rider_sensor);
        (body_handle, sensor_handle)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialQuery for PhysicsWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<f32> {
        PhysicsWorld::raycast(self, origin, direction, max_distance, filter_for(mask))
            .map(|(_, distance)| distance)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<ObjectId> {
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        let mut found = Vec::new();

        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape,
            filter_for(mask),
            |handle| {
                if let Some(collider) = self.collider_set.get(handle) {
                    found.push(ObjectId::from_bits(collider.user_data));
                }
                true
            },
        );

        found
    }
}
