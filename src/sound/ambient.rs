//! Ambient background sound driven by the settings.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ambient_source, SoundPlayer};
use crate::catalog::find_ambient_sound;
use crate::settings::AppSettings;

/// Keeps the ambient loop in line with `backgroundSound` and `volume`.
pub struct AmbientPlayer {
    player: Arc<dyn SoundPlayer>,
    sounds_dir: PathBuf,
    current: Option<String>,
}

impl AmbientPlayer {
    pub fn new(player: Arc<dyn SoundPlayer>, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            player,
            sounds_dir: sounds_dir.into(),
            current: None,
        }
    }

    /// Id of the sound currently looping.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Applies one settings value.
    ///
    /// `none` (or an id missing from the catalog) stops the loop, a new id
    /// restarts it, and the volume is applied either way.
    pub fn apply(&mut self, settings: &AppSettings) {
        let Some(sound) = find_ambient_sound(&settings.background_sound) else {
            if self.current.take().is_some() {
                debug!("Stopping ambient sound");
                self.player.stop_loop();
            }
            return;
        };

        if self.current.as_deref() == Some(sound.id) {
            self.player.set_loop_volume(settings.volume);
            return;
        }

        let source = ambient_source(&self.sounds_dir, sound);
        match self.player.play_looped(&source, settings.volume) {
            Ok(()) => {
                info!("Ambient sound: {}", sound.name);
                self.current = Some(sound.id.to_string());
            }
            Err(e) => {
                warn!("Failed to play ambient sound '{}': {}", sound.id, e);
                self.player.stop_loop();
                self.current = None;
            }
        }
    }

    /// Follows settings changes until `cancel` fires or the sender is dropped.
    pub async fn run(mut self, mut settings: watch::Receiver<AppSettings>, cancel: CancellationToken) {
        let initial = settings.borrow_and_update().clone();
        self.apply(&initial);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = settings.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = settings.borrow_and_update().clone();
                    self.apply(&value);
                }
            }
        }

        if self.current.take().is_some() {
            self.player.stop_loop();
        }
        debug!("Ambient player stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::MockSoundPlayer;

    fn settings(sound: &str, volume: f32) -> AppSettings {
        AppSettings {
            background_sound: sound.to_string(),
            volume,
            ..AppSettings::default()
        }
    }

    fn ambient(mock: &Arc<MockSoundPlayer>) -> AmbientPlayer {
        AmbientPlayer::new(mock.clone(), "/sounds")
    }

    #[test]
    fn test_none_plays_nothing() {
        let mock = Arc::new(MockSoundPlayer::new());
        let mut player = ambient(&mock);

        player.apply(&settings("none", 0.5));
        assert!(mock.looping().is_none());
        assert!(player.current().is_none());
    }

    #[test]
    fn test_select_sound_starts_loop() {
        let mock = Arc::new(MockSoundPlayer::new());
        let mut player = ambient(&mock);

        player.apply(&settings("espacio", 0.3));

        let (source, volume) = mock.looping().unwrap();
        assert_eq!(source.path(), Some(std::path::Path::new("/sounds/espacio.mp3")));
        assert_eq!(volume, 0.3);
        assert_eq!(player.current(), Some("espacio"));
    }

    #[test]
    fn test_volume_change_keeps_loop() {
        let mock = Arc::new(MockSoundPlayer::new());
        let mut player = ambient(&mock);

        player.apply(&settings("nuevo-dia", 0.5));
        player.apply(&settings("nuevo-dia", 0.9));

        let (source, volume) = mock.looping().unwrap();
        assert_eq!(source.name(), "nuevo-dia");
        assert_eq!(volume, 0.9);
    }

    #[test]
    fn test_switch_to_none_stops_loop() {
        let mock = Arc::new(MockSoundPlayer::new());
        let mut player = ambient(&mock);

        player.apply(&settings("espacio", 0.5));
        player.apply(&settings("none", 0.5));

        assert!(mock.looping().is_none());
    }

    #[test]
    fn test_playback_failure_is_not_fatal() {
        let mock = Arc::new(MockSoundPlayer::new());
        mock.set_should_fail(true);
        let mut player = ambient(&mock);

        player.apply(&settings("espacio", 0.5));
        assert!(player.current().is_none());

        mock.set_should_fail(false);
        player.apply(&settings("espacio", 0.5));
        assert_eq!(player.current(), Some("espacio"));
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_run_follows_settings() {
        let mock = Arc::new(MockSoundPlayer::new());
        let (tx, rx) = watch::channel(settings("lluvia-relajante", 0.4));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(ambient(&mock).run(rx, cancel.clone()));
        settle().await;
        assert_eq!(mock.looping().unwrap().0.name(), "lluvia-relajante");

        tx.send_replace(settings("none", 0.4));
        settle().await;
        assert!(mock.looping().is_none());

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_loop_on_cancel() {
        let mock = Arc::new(MockSoundPlayer::new());
        let (_tx, rx) = watch::channel(settings("espacio", 0.4));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(ambient(&mock).run(rx, cancel.clone()));
        settle().await;
        cancel.cancel();
        task.await.unwrap();

        assert!(mock.looping().is_none());
    }
}
