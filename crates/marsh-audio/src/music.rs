use std::path::Path;
use std::time::Duration;

use kira::manager::AudioManager;
use kira::manager::backend::DefaultBackend;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use kira::tween::Tween;

use crate::error::AudioError;

/// Something that can play one music track at a time.
///
/// The ambient loop only needs to start a track, poll whether it is still
/// audible, and change the volume of the live output.
pub trait TrackOutput {
    /// Start `track` from the beginning, replacing whatever was playing.
    fn play_track(&mut self, track: &Path) -> Result<(), AudioError>;
    /// Whether the last started track is still playing.
    fn is_track_playing(&self) -> bool;
    /// Set the music volume on the live output.
    fn set_music_volume(&mut self, volume: f64);
    /// Stop the current track.
    fn stop_track(&mut self);
}

/// Plays background music tracks through kira, one at a time, without looping.
pub struct MusicPlayer {
    current: Option<StaticSoundHandle>,
    music_volume: f64,
}

impl MusicPlayer {
    pub fn new(music_volume: f64) -> Self {
        Self {
            current: None,
            music_volume,
        }
    }

    /// Start playing a track once from the start at the current music volume.
    pub fn play_once(
        &mut self,
        manager: &mut AudioManager<DefaultBackend>,
        path: &Path,
    ) -> Result<(), AudioError> {
        self.stop(Duration::ZERO);

        let data = StaticSoundData::from_file(path)
            .map_err(|e| AudioError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let settings = StaticSoundSettings::new().volume(self.music_volume);
        let data = data.with_settings(settings);

        let handle = manager
            .play(data)
            .map_err(|e| AudioError::Playback {
                name: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.current = Some(handle);
        Ok(())
    }

    /// Whether the current track is still audible.
    pub fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|handle| handle.state() != PlaybackState::Stopped)
    }

    /// Stop the current music track with a fade-out.
    pub fn stop(&mut self, fade_out: Duration) {
        if let Some(ref mut handle) = self.current {
            handle.stop(Tween {
                duration: fade_out,
                ..Default::default()
            });
        }
        self.current = None;
    }

    /// Update the music volume (applied to the current track immediately).
    pub fn set_volume(&mut self, volume: f64) {
        self.music_volume = volume;
        if let Some(ref mut handle) = self.current {
            handle.set_volume(volume, Tween::default());
        }
    }
}
