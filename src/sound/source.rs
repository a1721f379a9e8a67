//! Sound sources: files on disk and generated tones.

use std::path::{Path, PathBuf};

use crate::catalog::AmbientSound;

/// File stem of a user-supplied alert sound.
pub const ALERT_SOUND_STEM: &str = "alert";

/// Extensions searched for the alert sound, in order.
const ALERT_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

/// Frequency of the generated alert tone.
pub const ALERT_TONE_HZ: u32 = 880;

/// Length of one generated alert tone.
pub const ALERT_TONE_MS: u64 = 1200;

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file decoded at play time.
    File {
        /// Display name
        name: String,
        /// Path to the audio file
        path: PathBuf,
    },
    /// A sine tone synthesized at play time.
    Tone {
        /// Display name
        name: String,
        frequency_hz: u32,
        duration_ms: u64,
    },
}

impl SoundSource {
    /// Creates a file sound source. The path is not checked.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a generated tone source.
    #[must_use]
    pub fn tone(name: impl Into<String>, frequency_hz: u32, duration_ms: u64) -> Self {
        Self::Tone {
            name: name.into(),
            frequency_hz,
            duration_ms,
        }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Tone { name, .. } => name,
        }
    }

    /// Returns the file path for file sources.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Tone { .. } => None,
        }
    }

    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone { .. })
    }
}

/// Returns the built-in alert tone.
#[must_use]
pub fn default_alert_tone() -> SoundSource {
    SoundSource::tone("alert-tone", ALERT_TONE_HZ, ALERT_TONE_MS)
}

/// Picks the alert sound: `alert.{mp3,wav,ogg}` in `sounds_dir` when
/// present, otherwise the generated tone.
#[must_use]
pub fn alert_sound(sounds_dir: Option<&Path>) -> SoundSource {
    let found = sounds_dir.and_then(|dir| {
        ALERT_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{ALERT_SOUND_STEM}.{ext}")))
            .find(|path| path.is_file())
    });

    match found {
        Some(path) => SoundSource::file(ALERT_SOUND_STEM, path),
        None => default_alert_tone(),
    }
}

/// Returns the file source for a catalog ambient sound.
#[must_use]
pub fn ambient_source(sounds_dir: &Path, sound: &AmbientSound) -> SoundSource {
    SoundSource::file(sound.id, sounds_dir.join(sound.file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_ambient_sound;
    use tempfile::TempDir;

    #[test]
    fn test_constructors() {
        let file = SoundSource::file("alert", "/tmp/alert.mp3");
        assert_eq!(file.name(), "alert");
        assert_eq!(file.path(), Some(Path::new("/tmp/alert.mp3")));
        assert!(!file.is_tone());

        let tone = default_alert_tone();
        assert!(tone.is_tone());
        assert!(tone.path().is_none());
    }

    #[test]
    fn test_alert_sound_without_dir_is_tone() {
        assert_eq!(alert_sound(None), default_alert_tone());
    }

    #[test]
    fn test_alert_sound_empty_dir_is_tone() {
        let dir = TempDir::new().unwrap();
        assert_eq!(alert_sound(Some(dir.path())), default_alert_tone());
    }

    #[test]
    fn test_alert_sound_prefers_file() {
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("alert.wav");
        std::fs::write(&wav, b"RIFF").unwrap();

        let source = alert_sound(Some(dir.path()));
        assert_eq!(source.path(), Some(wav.as_path()));
    }

    #[test]
    fn test_alert_sound_extension_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("alert.ogg"), b"OggS").unwrap();
        std::fs::write(dir.path().join("alert.mp3"), b"ID3").unwrap();

        let source = alert_sound(Some(dir.path()));
        assert_eq!(source.path(), Some(dir.path().join("alert.mp3").as_path()));
    }

    #[test]
    fn test_ambient_source() {
        let sound = find_ambient_sound("lluvia-relajante").unwrap();
        let source = ambient_source(Path::new("/data/sounds"), sound);
        assert_eq!(source.name(), "lluvia-relajante");
        assert_eq!(
            source.path(),
            Some(Path::new("/data/sounds/lluvia-relajante.mp3"))
        );
    }
}
