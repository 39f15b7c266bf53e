//! Teleport gate: shrink, spin and shake the actor, then change scene

use glam::{Quat, Vec3};
use marsh_core::{Body, Countdown, ObjectId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::{GameEvent, SoundCue};
use crate::player::ActorFlags;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    /// Seconds to shrink from the current scale to `min_scale`
    pub shrink_duration: f32,
    pub min_scale: f32,
    /// Yaw spin while the sequence runs, in degrees per second
    pub spin_speed: f32,
    /// Maximum camera offset per axis while spinning
    pub shake_intensity: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            shrink_duration: 1.0,
            min_scale: 0.01,
            spin_speed: 720.0,
            shake_intensity: 0.1,
        }
    }
}

/// Progress of the gate's sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportPhase {
    Idle,
    Shrinking { elapsed: f32, start_scale: Vec3 },
    /// Shrunk; waiting for the teleport cue to finish
    PlayingCue { countdown: Countdown },
    /// Scene change requested
    Finished,
}

#[derive(Debug, Clone)]
pub struct TeleportGate {
    id: ObjectId,
    target_scene: String,
    config: TeleportConfig,
    /// Length of the teleport cue, `None` when no cue is available
    cue_duration: Option<f32>,
    phase: TeleportPhase,
}

impl TeleportGate {
    pub fn new(
        id: ObjectId,
        target_scene: impl Into<String>,
        config: TeleportConfig,
        cue_duration: Option<f32>,
    ) -> Self {
        Self {
            id,
            target_scene: target_scene.into(),
            config,
            cue_duration,
            phase: TeleportPhase::Idle,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn phase(&self) -> TeleportPhase {
        self.phase
    }

    /// Whether a sequence is in progress
    pub fn is_running(&self) -> bool {
        matches!(
            self.phase,
            TeleportPhase::Shrinking { .. } | TeleportPhase::PlayingCue { .. }
        )
    }

    /// The actor entered the gate. Returns whether a sequence started.
    pub fn on_trigger_enter(&mut self, flags: &mut ActorFlags, scale: Vec3) -> bool {
        if self.is_running() {
            return false;
        }
        if !flags.is_teleport_available {
            info!("Gate is locked, collect all the food first");
            return false;
        }

        flags.is_keyboard_blocked = true;
        flags.is_teleport_available = false;
        self.phase = TeleportPhase::Shrinking {
            elapsed: 0.0,
            start_scale: scale,
        };
        info!("Teleporting to '{}'", self.target_scene);
        true
    }

    /// Advance the sequence by one frame tick
    pub fn update(
        &mut self,
        dt: f32,
        body: &mut dyn Body,
        scale: &mut Vec3,
        events: &mut Vec<GameEvent>,
    ) {
        match self.phase {
            TeleportPhase::Idle | TeleportPhase::Finished => {}
            TeleportPhase::Shrinking {
                elapsed,
                start_scale,
            } => {
                let elapsed = elapsed + dt;
                let t = if self.config.shrink_duration > 0.0 {
                    (elapsed / self.config.shrink_duration).min(1.0)
                } else {
                    1.0
                };
                let min_scale = Vec3::splat(self.config.min_scale);
                *scale = if t < 1.0 {
                    start_scale.lerp(min_scale, t)
                } else {
                    min_scale
                };
                self.spin(body, dt, events);

                if t < 1.0 {
                    self.phase = TeleportPhase::Shrinking {
                        elapsed,
                        start_scale,
                    };
                    return;
                }

                let wait = match self.cue_duration {
                    Some(duration) => {
                        events.push(GameEvent::PlayCue(SoundCue::Teleport));
                        duration
                    }
                    None => 0.0,
                };
                let countdown = Countdown::from_seconds(wait);
                if countdown.finished() {
                    self.finish(events);
                } else {
                    self.phase = TeleportPhase::PlayingCue { countdown };
                }
            }
            TeleportPhase::PlayingCue { mut countdown } => {
                self.spin(body, dt, events);
                if countdown.tick(dt) {
                    self.finish(events);
                } else {
                    self.phase = TeleportPhase::PlayingCue { countdown };
                }
            }
        }
    }

    fn spin(&self, body: &mut dyn Body, dt: f32, events: &mut Vec<GameEvent>) {
        let turn = Quat::from_rotation_y((self.config.spin_speed * dt).to_radians());
        body.set_rotation(turn * body.rotation());

        let intensity = self.config.shake_intensity;
        if intensity > 0.0 {
            let mut rng = rand::thread_rng();
            let offset = Vec3::new(
                rng.gen_range(-intensity..=intensity),
                rng.gen_range(-intensity..=intensity),
                rng.gen_range(-intensity..=intensity),
            );
            events.push(GameEvent::CameraShake(offset));
        }
    }

    fn finish(&mut self, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::CameraShake(Vec3::ZERO));
        events.push(GameEvent::LoadScene(self.target_scene.clone()));
        self.phase = TeleportPhase::Finished;
    }
}
