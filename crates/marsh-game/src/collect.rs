//! Food pickup: detection, idempotent consumption, and the unlock counter

use std::collections::HashMap;

use glam::Vec3;
use marsh_core::{Countdown, LayerMask, ObjectId, SpatialQuery};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::events::{GameEvent, SoundCue};
use crate::player::ActorFlags;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Radius of the proximity check around the actor
    pub pickup_radius: f32,
    /// Seconds between eating an item and removing it from the scene
    pub destroy_delay: f32,
    /// Layers searched by the proximity check
    pub item_mask: LayerMask,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            pickup_radius: 1.0,
            destroy_delay: 0.1,
            item_mask: LayerMask::ITEMS,
        }
    }
}

/// Eaten versus total food in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodCounter {
    eaten: u32,
    target: u32,
}

impl FoodCounter {
    pub fn new(target: u32) -> Self {
        Self { eaten: 0, target }
    }

    pub fn eaten(&self) -> u32 {
        self.eaten
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn is_complete(&self) -> bool {
        self.eaten == self.target
    }

    /// Count one item. Returns `true` on the increment that completes the set.
    fn increment(&mut self) -> bool {
        if self.eaten >= self.target {
            warn!("Food counter already at {}/{}", self.eaten, self.target);
            return false;
        }
        self.eaten += 1;
        self.is_complete()
    }

    pub fn hud_text(&self) -> String {
        format!("Eaten: {}/{}", self.eaten, self.target)
    }
}

/// Items eaten in this scene whose removal is still pending
#[derive(Debug, Clone, Default)]
pub struct CollectedItemSet {
    pending: HashMap<ObjectId, Countdown>,
}

impl CollectedItemSet {
    pub fn contains(&self, id: ObjectId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Mark `id` collected and schedule its removal. Returns `false` if already present.
    pub fn insert(&mut self, id: ObjectId, delay: f32) -> bool {
        if self.pending.contains_key(&id) {
            return false;
        }
        self.pending.insert(id, Countdown::from_seconds(delay));
        true
    }

    /// Advance every pending removal and return the ids now due
    pub fn tick(&mut self, dt: f32) -> Vec<ObjectId> {
        let mut due = Vec::new();
        for (id, countdown) in self.pending.iter_mut() {
            countdown.tick(dt);
            if countdown.finished() {
                due.push(*id);
            }
        }
        for id in &due {
            self.pending.remove(id);
        }
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Detects and consumes food near or touching the actor
#[derive(Debug, Clone)]
pub struct ItemCollector {
    config: CollectorConfig,
    collected: CollectedItemSet,
    counter: FoodCounter,
}

impl ItemCollector {
    pub fn new(config: CollectorConfig, target: u32) -> Self {
        Self {
            config,
            collected: CollectedItemSet::default(),
            counter: FoodCounter::new(target),
        }
    }

    pub fn counter(&self) -> &FoodCounter {
        &self.counter
    }

    pub fn collected(&self) -> &CollectedItemSet {
        &self.collected
    }

    /// Proximity path: consume every food item within the pickup radius
    pub fn detect_nearby<F>(
        &mut self,
        query: &dyn SpatialQuery,
        position: Vec3,
        is_food: F,
        flags: &mut ActorFlags,
        events: &mut Vec<GameEvent>,
    ) where
        F: Fn(ObjectId) -> bool,
    {
        let nearby = query.overlap_sphere(position, self.config.pickup_radius, self.config.item_mask);
        for id in nearby.into_iter().filter(|id| is_food(*id)) {
            self.consume(id, flags, events);
        }
    }

    /// Trigger path: an item sensor reported the actor entering it
    pub fn on_trigger_enter(
        &mut self,
        item: ObjectId,
        is_food: bool,
        flags: &mut ActorFlags,
        events: &mut Vec<GameEvent>,
    ) {
        if is_food {
            self.consume(item, flags, events);
        }
    }

    /// Eat `item` unless it was already eaten. Returns whether it was consumed now.
    pub fn consume(
        &mut self,
        item: ObjectId,
        flags: &mut ActorFlags,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !self.collected.insert(item, self.config.destroy_delay) {
            return false;
        }

        events.push(GameEvent::PlayCue(SoundCue::Eat));
        if self.counter.increment() {
            flags.is_teleport_available = true;
            info!("All food eaten, teleport unlocked");
        }
        events.push(GameEvent::HudText(self.counter.hud_text()));
        true
    }

    /// Advance pending removals; returns the items to remove from the scene
    pub fn tick(&mut self, dt: f32) -> Vec<ObjectId> {
        self.collected.tick(dt)
    }
}
