use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use kira::manager::AudioManager;
use kira::manager::backend::DefaultBackend;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use tracing::{debug, warn};

use crate::error::AudioError;

/// Named one-shot sound cues, loaded up front so their durations are known.
pub struct SfxPlayer {
    cues: HashMap<String, StaticSoundData>,
    active: Vec<StaticSoundHandle>,
    sfx_volume: f64,
}

impl SfxPlayer {
    pub fn new(sfx_volume: f64) -> Self {
        Self {
            cues: HashMap::new(),
            active: Vec::new(),
            sfx_volume,
        }
    }

    /// Load a cue from disk under `name`. Returns the cue's duration.
    pub fn register(&mut self, name: &str, path: &Path) -> Result<Duration, AudioError> {
        let data = StaticSoundData::from_file(path)
            .map_err(|e| AudioError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let duration = data.duration();
        debug!("Registered cue '{}' ({:.2}s)", name, duration.as_secs_f32());
        self.cues.insert(name.to_string(), data);
        Ok(duration)
    }

    /// Duration of a registered cue.
    pub fn duration(&self, name: &str) -> Option<Duration> {
        self.cues.get(name).map(|data| data.duration())
    }

    /// Play a registered cue. Unknown cues are skipped with a warning.
    pub fn play(
        &mut self,
        manager: &mut AudioManager<DefaultBackend>,
        name: &str,
    ) -> Result<(), AudioError> {
        let Some(data) = self.cues.get(name) else {
            warn!("Sound cue '{}' is not assigned, skipping", name);
            return Ok(());
        };
        let settings = StaticSoundSettings::new().volume(self.sfx_volume);
        let data = data.clone().with_settings(settings);
        let handle = manager
            .play(data)
            .map_err(|e| AudioError::Playback {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        self.active.push(handle);
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.sfx_volume = volume;
    }

    /// Remove handles for sounds that have stopped playing.
    pub fn cleanup(&mut self) {
        self.active.retain(|h| h.state() != PlaybackState::Stopped);
    }
}
