//! Background playlist that lives for the whole process

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::music::TrackOutput;

/// Persists the music volume between sessions.
pub trait VolumeStore {
    fn store_music_volume(&mut self, volume: f32);
}

/// Cycles through a playlist, one non-looping track after another.
#[derive(Debug)]
pub struct AmbientAudioLoop {
    tracks: Vec<PathBuf>,
    current: Option<usize>,
    volume: f32,
    /// Consecutive tracks that failed to start
    failures: usize,
}

impl AmbientAudioLoop {
    pub fn new(tracks: Vec<PathBuf>, volume: f32) -> Self {
        Self {
            tracks,
            current: None,
            volume: volume.clamp(0.0, 1.0),
            failures: 0,
        }
    }

    /// Index of the track most recently started
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Poll the output and start the next track once the current one ended.
    pub fn update(&mut self, output: &mut dyn TrackOutput) {
        if self.tracks.is_empty() || self.exhausted() {
            return;
        }
        if !output.is_track_playing() {
            self.play_next(output);
        }
    }

    /// Clamp to `[0, 1]`, apply to the live output, and persist.
    pub fn set_volume(
        &mut self,
        volume: f32,
        output: &mut dyn TrackOutput,
        store: &mut dyn VolumeStore,
    ) {
        self.volume = volume.clamp(0.0, 1.0);
        output.set_music_volume(self.volume as f64);
        store.store_music_volume(self.volume);
    }

    fn start(&mut self, output: &mut dyn TrackOutput) {
        output.set_music_volume(self.volume as f64);
        self.play_next(output);
    }

    fn play_next(&mut self, output: &mut dyn TrackOutput) {
        if self.tracks.is_empty() {
            return;
        }
        let index = match self.current {
            Some(index) => (index + 1) % self.tracks.len(),
            None => 0,
        };
        self.current = Some(index);

        let track = &self.tracks[index];
        match output.play_track(track) {
            Ok(()) => {
                self.failures = 0;
                info!("Now playing {:?}", track);
            }
            Err(e) => {
                self.failures += 1;
                warn!("Skipping track {:?}: {}", track, e);
                if self.exhausted() {
                    error!("No track in the playlist could be played, music disabled");
                }
            }
        }
    }

    fn exhausted(&self) -> bool {
        self.failures >= self.tracks.len()
    }
}

/// Outcome of offering an instance to the slot
#[derive(Debug)]
pub enum Install {
    /// The instance is now the live one and has started playing
    Installed,
    /// A live instance already exists; the offered one is handed back for disposal
    Discarded(AmbientAudioLoop),
}

/// Holds the single live playlist for the process.
#[derive(Debug, Default)]
pub struct AmbientSlot {
    instance: Option<AmbientAudioLoop>,
}

impl AmbientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `candidate` if no instance is live yet.
    pub fn install(&mut self, mut candidate: AmbientAudioLoop, output: &mut dyn TrackOutput) -> Install {
        if self.instance.is_some() {
            info!("Ambient music already running, discarding duplicate");
            return Install::Discarded(candidate);
        }
        candidate.start(output);
        self.instance = Some(candidate);
        Install::Installed
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    pub fn get(&self) -> Option<&AmbientAudioLoop> {
        self.instance.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut AmbientAudioLoop> {
        self.instance.as_mut()
    }

    /// Per-frame poll of the live instance
    pub fn update(&mut self, output: &mut dyn TrackOutput) {
        if let Some(instance) = self.instance.as_mut() {
            instance.update(output);
        }
    }

    /// Stop playback and release the live instance
    pub fn teardown(&mut self, output: &mut dyn TrackOutput) -> Option<AmbientAudioLoop> {
        let instance = self.instance.take()?;
        output.stop_track();
        Some(instance)
    }
}
