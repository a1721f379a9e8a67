//! Sound playback for the focus timer.
//!
//! This module provides:
//!
//! - The completion alert sound (a user file or a generated tone)
//! - Looping ambient background sound driven by settings
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      commands      ┌──────────────────┐
//! │ RodioSoundPlayer │ ─────────────────▶ │   audio thread   │
//! └──────────────────┘  crossbeam-channel │ alert + ambient  │
//!          ▲                              │      sinks       │
//!          │ dyn SoundPlayer              └──────────────────┘
//! ┌────────┴─────────┐
//! │ AlertSequencer / │
//! │ AmbientPlayer    │
//! └──────────────────┘
//! ```

mod ambient;
mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

pub use ambient::AmbientPlayer;
pub use error::SoundError;
pub use player::{player_or_silent, RodioSoundPlayer, SilentSoundPlayer};
pub use source::{
    alert_sound, ambient_source, default_alert_tone, SoundSource, ALERT_SOUND_STEM,
    ALERT_TONE_HZ, ALERT_TONE_MS,
};

/// Trait for sound playback implementations.
///
/// All methods return promptly; sounds play in the background.
pub trait SoundPlayer: Send + Sync {
    /// Plays `source` once on the alert channel, replacing any alert sound
    /// still playing.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or no device exists.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;

    /// Silences the alert channel.
    fn stop(&self);

    /// Loops `source` on the ambient channel at `volume`, replacing the
    /// current loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or no device exists.
    fn play_looped(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError>;

    /// Changes the ambient loop volume.
    fn set_loop_volume(&self, volume: f32);

    /// Silences the ambient channel.
    fn stop_loop(&self);

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    stop_calls: Mutex<usize>,
    looping: Mutex<Option<(SoundSource, f32)>>,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of successful alert plays.
    #[must_use]
    pub fn play_count(&self) -> usize {
        lock(&self.play_calls).len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        lock(&self.play_calls).clone()
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        *lock(&self.stop_calls)
    }

    /// The ambient loop currently playing, with its volume.
    #[must_use]
    pub fn looping(&self) -> Option<(SoundSource, f32)> {
        lock(&self.looping).clone()
    }

    fn fail(&self) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        Ok(())
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        self.fail()?;
        lock(&self.play_calls).push(source.clone());
        Ok(())
    }

    fn stop(&self) {
        *lock(&self.stop_calls) += 1;
    }

    fn play_looped(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError> {
        self.fail()?;
        *lock(&self.looping) = Some((source.clone(), volume));
        Ok(())
    }

    fn set_loop_volume(&self, volume: f32) {
        if let Some((_, current)) = lock(&self.looping).as_mut() {
            *current = volume;
        }
    }

    fn stop_loop(&self) {
        *lock(&self.looping) = None;
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
