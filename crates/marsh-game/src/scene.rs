//! A loaded level: the physics world plus every gameplay object in it
//!
//! The host drives a scene with two calls. [`Scene::update`] runs once per
//! rendered frame; [`Scene::fixed_update`] runs once per physics step, steps
//! the world, and dispatches the sensor transitions it produced. Requests for
//! the host pile up in an event list read with [`Scene::drain_events`].

use std::collections::HashMap;

use glam::{Quat, Vec3};
use marsh_core::{Animator, Body, LayerMask, ObjectId, Transform};
use marsh_physics::{ActorBodyConfig, BodyMut, PhysicsConfig, PhysicsWorld, SensorEvent};
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
use tracing::{debug, info};

use crate::collect::{FoodCounter, ItemCollector};
use crate::config::GameplayConfig;
use crate::events::GameEvent;
use crate::input::FrameInput;
use crate::level::{LevelDesc, LevelError, ObjectTag};
use crate::platform::{CarriedBy, MovingPlatform, PlatformConfig};
use crate::player::{ActorFlags, PlayerController, Respawner};
use crate::props::{BouncePad, BouncePadConfig, Companion, SpinningFood};
use crate::teleport::TeleportGate;

/// Services the host hands to a scene when loading it
pub struct SceneHost {
    pub animator: Option<Box<dyn Animator>>,
    /// Length of the teleport cue in seconds, if the cue is loaded
    pub teleport_cue: Option<f32>,
    pub physics: PhysicsConfig,
}

impl Default for SceneHost {
    fn default() -> Self {
        Self {
            animator: None,
            teleport_cue: None,
            physics: PhysicsConfig::default(),
        }
    }
}

struct PlayerEntity {
    id: ObjectId,
    body: RigidBodyHandle,
    collider: ColliderHandle,
    controller: PlayerController,
    respawner: Respawner,
}

struct ItemEntity {
    tag: ObjectTag,
    collider: ColliderHandle,
    transform: Transform,
    spin: Option<SpinningFood>,
}

struct PlatformEntity {
    platform: MovingPlatform,
    body: RigidBodyHandle,
}

/// Handles of a body that platforms and pads act on
#[derive(Clone, Copy)]
struct BodyHandles {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

pub struct Scene {
    name: String,
    physics: PhysicsWorld,
    player: PlayerEntity,
    items: HashMap<ObjectId, ItemEntity>,
    loose: HashMap<ObjectId, BodyHandles>,
    collector: ItemCollector,
    gates: Vec<TeleportGate>,
    platforms: Vec<PlatformEntity>,
    carried: CarriedBy,
    pads: Vec<BouncePad>,
    companions: Vec<Companion>,
    events: Vec<GameEvent>,
}

impl Scene {
    /// Build a scene from a level description
    pub fn load(desc: &LevelDesc, config: &GameplayConfig, host: SceneHost) -> Result<Self, LevelError> {
        desc.validate()?;

        let mut physics = PhysicsWorld::with_config(host.physics);
        if let Some(height) = desc.ground_height {
            physics.create_ground(height);
        }
        for ground in &desc.ground {
            physics.create_static_box(ground.half_extents, ground.position);
        }

        let player_id = ObjectId::new();
        let (body, collider) =
            ActorBodyConfig::default().spawn(&mut physics, player_id, desc.player.spawn);
        if desc.player.yaw != 0.0 {
            BodyMut::new(&mut physics, body, Some(collider))
                .set_rotation(Quat::from_rotation_y(desc.player.yaw.to_radians()));
        }
        let mut controller = PlayerController::new(
            config.movement.clone(),
            config.ground_probe.clone(),
            host.animator,
        );
        let respawner = Respawner::new(&config.respawn, desc.player.respawn, desc.player.spawn);

        let mut items = HashMap::new();
        for item in &desc.items {
            let id = ObjectId::new();
            let collider = physics.add_ball_sensor(id, item.radius, item.position, LayerMask::ITEMS);
            let mut transform = Transform::from_position(item.position);
            let spin = (item.tag == ObjectTag::Food)
                .then(|| SpinningFood::new(item.spin_speed, &mut transform));
            items.insert(
                id,
                ItemEntity {
                    tag: item.tag,
                    collider,
                    transform,
                    spin,
                },
            );
        }

        let target = desc.food_count() as u32;
        let collector = ItemCollector::new(config.collector.clone(), target);
        if target == 0 {
            controller.flags.is_teleport_available = true;
            info!("Level '{}' has no food, teleport unlocked", desc.name);
        }

        let platforms = desc
            .platforms
            .iter()
            .map(|p| {
                let id = ObjectId::new();
                let (body, _) = physics.create_kinematic_platform(id, p.half_extents, p.position);
                let platform_config = PlatformConfig {
                    axis_mask: p.axis_mask,
                    speed: p.speed,
                    travel_distance: p.travel_distance,
                    dwell_time: p.dwell_time,
                    frozen: p.frozen,
                };
                let frame = Quat::from_rotation_y(p.yaw.to_radians());
                PlatformEntity {
                    platform: MovingPlatform::new(id, &platform_config, frame),
                    body,
                }
            })
            .collect();

        let gates = desc
            .gates
            .iter()
            .map(|g| {
                let id = ObjectId::new();
                physics.add_box_sensor(id, g.half_extents, g.position);
                TeleportGate::new(id, g.target_scene.clone(), config.teleport.clone(), host.teleport_cue)
            })
            .collect();

        let pads = desc
            .bounce_pads
            .iter()
            .map(|p| {
                let id = ObjectId::new();
                physics.add_box_sensor(id, p.half_extents, p.position);
                BouncePad::new(
                    id,
                    BouncePadConfig {
                        repel_force: p.repel_force,
                    },
                )
            })
            .collect();

        let companions = desc
            .companions
            .iter()
            .map(|c| {
                let id = ObjectId::new();
                physics.add_ball_sensor(id, c.radius, c.position, LayerMask::TRIGGERS);
                Companion::new(id, c.position)
            })
            .collect();

        let loose = desc
            .loose_bodies
            .iter()
            .map(|b| {
                let id = ObjectId::new();
                let (body, collider) =
                    physics.create_dynamic_box(id, b.half_extents, b.position, b.density);
                (id, BodyHandles { body, collider })
            })
            .collect();

        physics.refresh_queries();
        info!("Scene '{}' loaded with {} food", desc.name, target);

        Ok(Self {
            name: desc.name.clone(),
            physics,
            player: PlayerEntity {
                id: player_id,
                body,
                collider,
                controller,
                respawner,
            },
            items,
            loose,
            events: vec![GameEvent::HudText(collector.counter().hud_text())],
            collector,
            gates,
            platforms,
            carried: CarriedBy::default(),
            pads,
            companions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player_id(&self) -> ObjectId {
        self.player.id
    }

    pub fn flags(&self) -> &ActorFlags {
        &self.player.controller.flags
    }

    pub fn flags_mut(&mut self) -> &mut ActorFlags {
        &mut self.player.controller.flags
    }

    pub fn food_counter(&self) -> &FoodCounter {
        self.collector.counter()
    }

    /// Items still present in the scene, eaten or not
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn player_position(&self) -> Vec3 {
        self.physics
            .body_position(self.player.body)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn player_scale(&self) -> Vec3 {
        self.player.controller.scale
    }

    pub fn gates(&self) -> &[TeleportGate] {
        &self.gates
    }

    pub fn platforms(&self) -> impl Iterator<Item = &MovingPlatform> {
        self.platforms.iter().map(|entry| &entry.platform)
    }

    pub fn companions(&self) -> &[Companion] {
        &self.companions
    }

    /// Platform the player currently rides
    pub fn player_carried_by(&self) -> Option<ObjectId> {
        self.carried.carried_by(self.player.id)
    }

    /// Platform a loose body or the player currently rides
    pub fn carried_by(&self, rider: ObjectId) -> Option<ObjectId> {
        self.carried.carried_by(rider)
    }

    /// Ids and positions of the loose dynamic bodies
    pub fn loose_bodies(&self) -> impl Iterator<Item = (ObjectId, Vec3)> + '_ {
        self.loose.iter().map(|(id, handles)| {
            let position = self.physics.body_position(handles.body).unwrap_or(Vec3::ZERO);
            (*id, position)
        })
    }

    /// Host requests accumulated since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn player_pose(&self) -> (Vec3, Quat) {
        let position = self.player_position();
        let rotation = self
            .physics
            .body_rotation(self.player.body)
            .unwrap_or(Quat::IDENTITY);
        (position, rotation)
    }

    fn player_grounded(&self) -> bool {
        let half_height = self.physics.collider_half_height(self.player.collider);
        self.player
            .controller
            .probe()
            .check(&self.physics, self.player_position(), half_height)
    }

    /// Frame tick
    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        let grounded = self.player_grounded();
        let player = &mut self.player;

        {
            let mut body = BodyMut::new(&mut self.physics, player.body, Some(player.collider));
            player.controller.begin_frame(grounded, input, &mut body);
            let respawn = input.respawn_pressed && !player.controller.flags.is_keyboard_blocked;
            player.respawner.update(respawn, &mut body, dt);
        }

        let position = self.physics.body_position(player.body).unwrap_or(Vec3::ZERO);
        let items = &self.items;
        self.collector.detect_nearby(
            &self.physics,
            position,
            |id| items.get(&id).is_some_and(|item| item.tag == ObjectTag::Food),
            &mut player.controller.flags,
            &mut self.events,
        );

        {
            let mut body = BodyMut::new(&mut self.physics, player.body, Some(player.collider));
            player.controller.end_frame(&mut body, dt);
            for gate in &mut self.gates {
                gate.update(dt, &mut body, &mut player.controller.scale, &mut self.events);
            }
        }

        for item in self.items.values_mut() {
            if let Some(spin) = item.spin {
                spin.tick(&mut item.transform, dt);
            }
        }

        let due = self.collector.tick(dt);
        if !due.is_empty() {
            for id in due {
                if let Some(item) = self.items.remove(&id) {
                    self.physics.remove_collider(item.collider);
                    debug!("Removed eaten item {:?}", id.0);
                }
            }
            self.physics.refresh_queries();
        }

        let (position, rotation) = self.player_pose();
        for companion in &mut self.companions {
            companion.follow(position, rotation);
        }
    }

    /// Physics tick
    pub fn fixed_update(&mut self, dt: f32) {
        for entry in &mut self.platforms {
            let delta = entry.platform.tick(dt);
            if delta == Vec3::ZERO {
                continue;
            }
            self.physics.move_kinematic(entry.body, delta);

            for rider in self.carried.riders_of(entry.platform.id()) {
                let Some(handles) = body_of(&self.player, &self.loose, rider) else {
                    continue;
                };
                let mut body =
                    BodyMut::new(&mut self.physics, handles.body, Some(handles.collider));
                let position = body.position();
                body.set_position(position + delta);
            }
        }

        let grounded = self.player_grounded();
        {
            let player = &mut self.player;
            let mut body = BodyMut::new(&mut self.physics, player.body, Some(player.collider));
            player.controller.fixed_update(&mut body, grounded, dt);
        }

        for pad in &mut self.pads {
            for other in pad.occupants() {
                let Some(handles) = body_of(&self.player, &self.loose, other) else {
                    continue;
                };
                let mut body = BodyMut::new(&mut self.physics, handles.body, Some(handles.collider));
                pad.on_trigger_stay(other, &mut body);
            }
        }

        self.physics.step();
        for event in self.physics.drain_sensor_events() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Entered { sensor, other } => {
                if other == self.player.id {
                    self.on_player_enter(sensor);
                } else if self.loose.contains_key(&other) {
                    self.on_body_enter(sensor, other);
                }
            }
            SensorEvent::Exited { sensor, other } => {
                if self.platforms.iter().any(|e| e.platform.id() == sensor) {
                    self.carried.detach(other, sensor);
                } else if let Some(pad) = self.pads.iter_mut().find(|p| p.id() == sensor) {
                    pad.on_trigger_exit(other);
                }
            }
        }
    }

    fn on_player_enter(&mut self, sensor: ObjectId) {
        let (position, rotation) = self.player_pose();
        let flags = &mut self.player.controller.flags;

        if let Some(item) = self.items.get(&sensor) {
            let is_food = item.tag == ObjectTag::Food;
            self.collector
                .on_trigger_enter(sensor, is_food, flags, &mut self.events);
        } else if let Some(gate) = self.gates.iter_mut().find(|g| g.id() == sensor) {
            gate.on_trigger_enter(flags, self.player.controller.scale);
        } else if let Some(companion) = self.companions.iter_mut().find(|c| c.id() == sensor) {
            companion.on_player_enter(position, rotation);
        } else {
            self.on_body_enter(sensor, self.player.id);
        }
    }

    /// Platform and pad entry, shared by the player and loose bodies
    fn on_body_enter(&mut self, sensor: ObjectId, other: ObjectId) {
        if let Some(entry) = self.platforms.iter_mut().find(|e| e.platform.id() == sensor) {
            entry.platform.wake();
            self.carried.attach(other, sensor);
        } else if let Some(pad) = self.pads.iter_mut().find(|p| p.id() == sensor) {
            pad.on_trigger_enter(other);
        }
    }
}

fn body_of(
    player: &PlayerEntity,
    loose: &HashMap<ObjectId, BodyHandles>,
    id: ObjectId,
) -> Option<BodyHandles> {
    if id == player.id {
        Some(BodyHandles {
            body: player.body,
            collider: player.collider,
        })
    } else {
        loose.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teleport::{TeleportConfig, TeleportPhase};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn run(scene: &mut Scene, frames: usize, input: &FrameInput) {
        for _ in 0..frames {
            scene.update(input, DT);
            scene.fixed_update(DT);
        }
    }

    fn quick_config() -> GameplayConfig {
        GameplayConfig {
            teleport: TeleportConfig {
                shrink_duration: 0.1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn level(text: &str) -> LevelDesc {
        LevelDesc::from_toml_str(text).expect("test level parses")
    }

    const FEAST: &str = r#"
        name = "feast"
        ground_height = 0.0

        [player]
        spawn = [0.0, 0.9, 0.0]

        [[items]]
        tag = "food"
        position = [0.3, 0.9, 0.0]

        [[items]]
        tag = "food"
        position = [-0.3, 0.9, 0.0]

        [[items]]
        tag = "prop"
        position = [0.0, 0.9, 0.3]

        [[gates]]
        position = [0.0, 0.9, 0.0]
        half_extents = [1.0, 1.0, 1.0]
        target_scene = "castle"
    "#;

    #[test]
    fn test_player_settles_on_ground() {
        let desc = level(
            r#"
            name = "plain"
            ground_height = 0.0
            [player]
            spawn = [0.0, 2.0, 0.0]
            "#,
        );
        let mut scene = Scene::load(&desc, &GameplayConfig::default(), SceneHost::default())
            .expect("scene loads");
        run(&mut scene, 180, &FrameInput::default());

        assert!((scene.player_position().y - 0.9).abs() < 0.05);
        assert!(scene.flags().is_grounded);
        assert!(!scene.flags().is_jumping);
    }

    #[test]
    fn test_host_can_block_the_keyboard() {
        let desc = level(
            r#"
            name = "plain"
            ground_height = 0.0
            [player]
            spawn = [0.0, 1.0, 0.0]
            "#,
        );
        let mut scene = Scene::load(&desc, &GameplayConfig::default(), SceneHost::default())
            .expect("scene loads");
        run(&mut scene, 60, &FrameInput::default());
        let forward = FrameInput {
            movement: Vec2::new(0.0, 1.0),
            ..Default::default()
        };

        scene.flags_mut().is_keyboard_blocked = true;
        let start = scene.player_position();
        run(&mut scene, 30, &forward);
        let blocked = scene.player_position() - start;
        assert!(Vec2::new(blocked.x, blocked.z).length() < 0.01);

        scene.flags_mut().is_keyboard_blocked = false;
        run(&mut scene, 30, &forward);
        let moved = scene.player_position() - start;
        assert!(Vec2::new(moved.x, moved.z).length() > 0.5);
    }

    #[test]
    fn test_eating_everything_opens_the_gate() {
        let mut scene =
            Scene::load(&level(FEAST), &quick_config(), SceneHost::default()).expect("scene loads");
        assert_eq!(scene.food_counter().target(), 2);
        assert!(!scene.flags().is_teleport_available);

        let mut events = scene.drain_events();
        for _ in 0..30 {
            scene.update(&FrameInput::default(), DT);
            scene.fixed_update(DT);
            events.extend(scene.drain_events());
        }

        assert_eq!(scene.food_counter().eaten(), 2);
        assert!(events.contains(&GameEvent::HudText("Eaten: 0/2".into())));
        assert!(events.contains(&GameEvent::HudText("Eaten: 2/2".into())));
        // Only the prop remains once the eaten food is removed
        assert_eq!(scene.item_count(), 1);

        let loads: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LoadScene(_)))
            .collect();
        assert_eq!(loads, vec![&GameEvent::LoadScene("castle".into())]);
        assert_eq!(scene.gates()[0].phase(), TeleportPhase::Finished);
        assert!(scene.flags().is_keyboard_blocked);
        assert!(!scene.flags().is_teleport_available);
        assert!(scene.player_scale().x < 0.02);
    }

    #[test]
    fn test_locked_gate_stays_closed() {
        let desc = level(
            r#"
            name = "locked"
            ground_height = 0.0
            [player]
            spawn = [0.0, 0.9, 0.0]
            [[items]]
            tag = "food"
            position = [20.0, 0.5, 0.0]
            [[gates]]
            position = [0.0, 0.9, 0.0]
            half_extents = [1.0, 1.0, 1.0]
            target_scene = "castle"
            "#,
        );
        let mut scene =
            Scene::load(&desc, &quick_config(), SceneHost::default()).expect("scene loads");
        run(&mut scene, 30, &FrameInput::default());

        assert_eq!(scene.gates()[0].phase(), TeleportPhase::Idle);
        assert!(!scene.flags().is_keyboard_blocked);
        assert!(!scene
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::LoadScene(_))));
    }

    #[test]
    fn test_empty_level_is_unlocked() {
        let desc = level(
            r#"
            name = "empty"
            [player]
            spawn = [0.0, 0.0, 0.0]
            "#,
        );
        let scene = Scene::load(&desc, &GameplayConfig::default(), SceneHost::default())
            .expect("scene loads");
        assert!(scene.flags().is_teleport_available);
        assert!(scene.food_counter().is_complete());
    }

    #[test]
    fn test_platform_carries_rider() {
        let desc = level(
            r#"
            name = "lift"
            [player]
            spawn = [0.0, 0.95, 0.0]
            [[platforms]]
            position = [0.0, -0.25, 0.0]
            half_extents = [3.0, 0.25, 3.0]
            axis_mask = [1, 0, 0]
            speed = 1.0
            travel_distance = 10.0
            dwell_time = 0.0
            frozen = true
            "#,
        );
        let mut scene = Scene::load(&desc, &GameplayConfig::default(), SceneHost::default())
            .expect("scene loads");
        assert!(scene.platforms().all(|p| p.is_frozen()));

        run(&mut scene, 90, &FrameInput::default());

        assert!(scene.player_carried_by().is_some());
        assert!(scene.platforms().all(|p| !p.is_frozen()));
        assert!(scene.player_position().x > 0.5);
    }

    #[test]
    fn test_platform_carries_loose_body() {
        let desc = level(
            r#"
            name = "cargo"
            [player]
            spawn = [30.0, 0.95, 0.0]
            [[ground]]
            position = [30.0, -0.5, 0.0]
            half_extents = [2.0, 0.5, 2.0]
            [[platforms]]
            position = [0.0, -0.25, 0.0]
            half_extents = [3.0, 0.25, 3.0]
            axis_mask = [1, 0, 0]
            speed = 1.0
            travel_distance = 10.0
            dwell_time = 0.0
            frozen = true
            [[loose_bodies]]
            position = [0.0, 0.3, 0.0]
            half_extents = [0.25, 0.25, 0.25]
            "#,
        );
        let mut scene = Scene::load(&desc, &GameplayConfig::default(), SceneHost::default())
            .expect("scene loads");
        let (cargo, _) = scene.loose_bodies().next().expect("one loose body");

        run(&mut scene, 90, &FrameInput::default());

        let platform = scene.platforms().next().expect("one platform").id();
        assert_eq!(scene.carried_by(cargo), Some(platform));
        assert!(scene.player_carried_by().is_none());
        let (_, position) = scene.loose_bodies().next().expect("one loose body");
        assert!(position.x > 0.5);
    }

    #[test]
    fn test_bounce_pad_launches_loose_body() {
        let desc = level(
            r#"
            name = "spring"
            ground_height = 0.0
            [player]
            spawn = [30.0, 0.95, 0.0]
            [[bounce_pads]]
            position = [0.0, 0.1, 0.0]
            half_extents = [1.0, 0.2, 1.0]
            repel_force = 10.0
            [[loose_bodies]]
            position = [0.0, 2.0, 0.0]
            half_extents = [0.5, 0.5, 0.5]
            "#,
        );
        let mut scene = Scene::load(&desc, &GameplayConfig::default(), SceneHost::default())
            .expect("scene loads");

        let mut peak = 0.0_f32;
        let mut lowest = f32::MAX;
        for _ in 0..180 {
            scene.update(&FrameInput::default(), DT);
            scene.fixed_update(DT);
            let (_, position) = scene.loose_bodies().next().expect("one loose body");
            lowest = lowest.min(position.y);
            if lowest < 1.0 {
                peak = peak.max(position.y);
            }
        }
        // Unit mass, so the impulse is a 10 m/s launch
        assert!(peak > 3.0, "peak {peak}");
    }
}
