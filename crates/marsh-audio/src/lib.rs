//! Marsh Audio - Audio playback and management using kira
//!
//! Provides the background playlist, named sound cues, and volume control.

mod ambient;
mod config;
mod error;
mod manager;
mod music;
mod sfx;

pub use ambient::{AmbientAudioLoop, AmbientSlot, Install, VolumeStore};
pub use config::AudioConfig;
pub use error::AudioError;
pub use manager::AudioEngine;
pub use music::TrackOutput;
