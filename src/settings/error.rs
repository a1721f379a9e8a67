//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating or persisting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Volume outside `0.0..=1.0`
    #[error("volume must be between 0.0 and 1.0, got {0}")]
    InvalidVolume(f32),

    /// Theme id not present in the catalog
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// Ambient sound id not present in the catalog
    #[error("unknown background sound: {0}")]
    UnknownSound(String),

    /// The settings file could not be read or written
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings could not be encoded or decoded
    #[error("settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SettingsError {
    /// Returns true for validation failures caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SettingsError::InvalidVolume(_)
                | SettingsError::UnknownTheme(_)
                | SettingsError::UnknownSound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SettingsError::InvalidVolume(1.5).to_string(),
            "volume must be between 0.0 and 1.0, got 1.5"
        );
        assert_eq!(
            SettingsError::UnknownTheme("x".into()).to_string(),
            "unknown theme: x"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(SettingsError::UnknownSound("jazz".into()).is_validation());
        let io = SettingsError::Io {
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::other("denied"),
        };
        assert!(!io.is_validation());
    }
}
