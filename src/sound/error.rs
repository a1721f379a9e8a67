//! Sound system error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the audio thread and the mock players.
#[derive(Debug, Error)]
pub enum SoundError {
    /// No output device, or the audio thread is gone.
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("cannot open sound file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// A sink could not be attached to the output stream.
    #[error("failed to open audio stream: {0}")]
    StreamError(String),

    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// True when retrying with another file would not help.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// True when the sound file itself is the problem.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::DecodeError(_))
    }
}
