//! Sensor enter/exit reporting
//!
//! rapier keeps the current set of intersecting sensor pairs in its narrow
//! phase. The tracker diffs that set between steps and turns the difference
//! into discrete enter and exit transitions.

use std::collections::HashSet;

use marsh_core::ObjectId;
use rapier3d::prelude::*;

/// A sensor overlap transition between two objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// `other` started overlapping the sensor owned by `sensor`
    Entered { sensor: ObjectId, other: ObjectId },
    /// `other` stopped overlapping the sensor owned by `sensor`
    Exited { sensor: ObjectId, other: ObjectId },
}

#[derive(Debug, Default)]
pub(crate) struct SensorTracker {
    watched: Vec<ColliderHandle>,
    /// (sensor, other) pairs overlapping after the last refresh
    overlapping: HashSet<(ColliderHandle, ColliderHandle)>,
    /// Owners of every collider seen in `overlapping`, kept so exits can be
    /// reported after a collider was removed
    owners: Vec<(ColliderHandle, ObjectId)>,
    pending: Vec<SensorEvent>,
}

impl SensorTracker {
    pub fn watch(&mut self, sensor: ColliderHandle) {
        if !self.watched.contains(&sensor) {
            self.watched.push(sensor);
        }
    }

    /// Stop tracking a collider. Pairs involving it vanish without an exit event.
    pub fn forget(&mut self, handle: ColliderHandle) {
        self.watched.retain(|h| *h != handle);
        self.overlapping
            .retain(|(sensor, other)| *sensor != handle && *other != handle);
        self.owners.retain(|(h, _)| *h != handle);
    }

    pub fn refresh(&mut self, narrow_phase: &NarrowPhase, colliders: &ColliderSet) {
        let mut current = HashSet::new();

        for &sensor in &self.watched {
            for (a, b, intersecting) in narrow_phase.intersection_pairs_with(sensor) {
                if !intersecting {
                    continue;
                }
                let other = if a == sensor { b } else { a };
                current.insert((sensor, other));
            }
        }

        let entered: Vec<_> = current.difference(&self.overlapping).copied().collect();
        let exited: Vec<_> = self.overlapping.difference(&current).copied().collect();

        for (sensor, other) in entered {
            let (Some(sensor_id), Some(other_id)) =
                (owner(colliders, sensor), owner(colliders, other))
            else {
                continue;
            };
            self.remember(sensor, sensor_id);
            self.remember(other, other_id);
            self.pending.push(SensorEvent::Entered {
                sensor: sensor_id,
                other: other_id,
            });
        }

        for (sensor, other) in exited {
            let (Some(sensor_id), Some(other_id)) = (self.owner(sensor), self.owner(other)) else {
                continue;
            };
            self.pending.push(SensorEvent::Exited {
                sensor: sensor_id,
                other: other_id,
            });
        }

        self.overlapping = current;
        let overlapping = &self.overlapping;
        self.owners.retain(|(handle, _)| {
            overlapping
                .iter()
                .any(|(sensor, other)| sensor == handle || other == handle)
        });
    }

    pub fn drain(&mut self) -> Vec<SensorEvent> {
        std::mem::take(&mut self.pending)
    }

    fn remember(&mut self, handle: ColliderHandle, id: ObjectId) {
        if self.owner(handle).is_none() {
            self.owners.push((handle, id));
        }
    }

    fn owner(&self, handle: ColliderHandle) -> Option<ObjectId> {
        self.owners
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, id)| *id)
    }
}

fn owner(colliders: &ColliderSet, handle: ColliderHandle) -> Option<ObjectId> {
    colliders
        .get(handle)
        .map(|collider| ObjectId::from_bits(collider.user_data))
}
