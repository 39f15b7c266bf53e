//! Requests gameplay code makes of the host

use glam::Vec3;

/// Named one-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A food item was eaten
    Eat,
    /// The teleport sequence finished shrinking the actor
    Teleport,
}

impl SoundCue {
    /// Name the cue is registered under in the audio engine
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Eat => "eat",
            SoundCue::Teleport => "teleport",
        }
    }
}

/// Something the scene wants the host to do after a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Play a one-shot cue
    PlayCue(SoundCue),
    /// Replace the HUD text
    HudText(String),
    /// Load the scene with this name
    LoadScene(String),
    /// Offset the camera; `Vec3::ZERO` ends the shake
    CameraShake(Vec3),
}
