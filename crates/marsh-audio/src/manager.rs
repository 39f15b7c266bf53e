use std::path::Path;
use std::time::Duration;

use kira::manager::{AudioManager, AudioManagerSettings};
use kira::manager::backend::DefaultBackend;
use tracing::info;

use crate::config::AudioConfig;
use crate::error::AudioError;
use crate::music::{MusicPlayer, TrackOutput};
use crate::sfx::SfxPlayer;

/// The main audio engine. Wraps kira's AudioManager and provides music and
/// sound cue APIs.
pub struct AudioEngine {
    manager: AudioManager<DefaultBackend>,
    music: MusicPlayer,
    sfx: SfxPlayer,
    config: AudioConfig,
}

impl AudioEngine {
    /// Create a new AudioEngine with the given config.
    pub fn new(config: AudioConfig) -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::BackendUnavailable(e.to_string()))?;

        info!("Audio engine initialized");

        Ok(Self {
            manager,
            music: MusicPlayer::new(config.effective_music_volume()),
            sfx: SfxPlayer::new(config.effective_sfx_volume()),
            config,
        })
    }

    // ---- Sound cues ----

    /// Load a named cue. Returns its duration.
    pub fn register_cue(&mut self, name: &str, path: &Path) -> Result<Duration, AudioError> {
        self.sfx.register(name, path)
    }

    /// Duration of a named cue, if registered.
    pub fn cue_duration(&self, name: &str) -> Option<Duration> {
        self.sfx.duration(name)
    }

    /// Play a named cue once.
    pub fn play_cue(&mut self, name: &str) -> Result<(), AudioError> {
        self.sfx.play(&mut self.manager, name)
    }

    // ---- Per-frame ----

    /// Call each frame to clean up finished sounds.
    pub fn update(&mut self) {
        self.sfx.cleanup();
    }
}

impl TrackOutput for AudioEngine {
    fn play_track(&mut self, track: &Path) -> Result<(), AudioError> {
        self.music.play_once(&mut self.manager, track)
    }

    fn is_track_playing(&self) -> bool {
        self.music.is_playing()
    }

    /// `volume` is the music channel level; master volume still applies.
    fn set_music_volume(&mut self, volume: f64) {
        self.config.music_volume = volume;
        self.music.set_volume(self.config.effective_music_volume());
    }

    fn stop_track(&mut self) {
        self.music.stop(Duration::from_millis(250));
    }
}
