use std::path::PathBuf;

/// Errors raised by the audio engine.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output available: {0}")]
    BackendUnavailable(String),

    #[error("could not decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("could not start '{name}': {reason}")]
    Playback { name: String, reason: String },
}
