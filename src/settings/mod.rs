//! User preferences and their persistent store.
//!
//! Settings are a single JSON object stored under the fixed key
//! [`SETTINGS_STORAGE_KEY`]. Stored values are merged over the defaults on
//! load, so files written by older versions keep working. Every accepted
//! change is saved and published to subscribers through a
//! [`tokio::sync::watch`] channel.

mod error;

pub use error::SettingsError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::catalog::{default_theme_for, find_theme, is_known_sound_id, ThemeMode, NO_SOUND_ID};

/// Storage key for persisted settings. Also the settings file stem.
pub const SETTINGS_STORAGE_KEY: &str = "prod-uibo-settings";

// ============================================================================
// Language
// ============================================================================

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    /// Returns the language code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }
}

// ============================================================================
// AppSettings
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Open in the compact layout
    pub start_in_mini_mode: bool,
    /// Ask before stopping a countdown
    pub confirm_on_stop: bool,
    /// Keep the window above others
    pub always_on_top: bool,
    pub language: Language,
    pub theme_mode: ThemeMode,
    pub selected_theme_id: String,
    /// Ambient sound id, or `none`
    pub background_sound: String,
    /// Ambient volume in `0.0..=1.0`
    pub volume: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            start_in_mini_mode: false,
            confirm_on_stop: true,
            always_on_top: false,
            language: Language::Es,
            theme_mode: ThemeMode::Dark,
            selected_theme_id: "dark-default".to_string(),
            background_sound: NO_SOUND_ID.to_string(),
            volume: 0.5,
        }
    }
}

/// Partial settings update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_in_mini_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_on_stop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_on_top: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_mode: Option<ThemeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_theme_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
}

impl SettingsPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if let Some(volume) = self.volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(SettingsError::InvalidVolume(volume));
            }
        }
        if let Some(id) = &self.selected_theme_id {
            if find_theme(id).is_none() {
                return Err(SettingsError::UnknownTheme(id.clone()));
            }
        }
        if let Some(id) = &self.background_sound {
            if !is_known_sound_id(id) {
                return Err(SettingsError::UnknownSound(id.clone()));
            }
        }
        Ok(())
    }
}

impl AppSettings {
    /// Applies a validated patch.
    ///
    /// Switching `theme_mode` without naming a theme selects the first static
    /// theme of the new mode.
    fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.start_in_mini_mode {
            self.start_in_mini_mode = v;
        }
        if let Some(v) = patch.confirm_on_stop {
            self.confirm_on_stop = v;
        }
        if let Some(v) = patch.always_on_top {
            self.always_on_top = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
        if let Some(mode) = patch.theme_mode {
            if mode != self.theme_mode && patch.selected_theme_id.is_none() {
                self.selected_theme_id = default_theme_for(mode).id.to_string();
            }
            self.theme_mode = mode;
        }
        if let Some(id) = patch.selected_theme_id {
            self.selected_theme_id = id;
        }
        if let Some(id) = patch.background_sound {
            self.background_sound = id;
        }
        if let Some(v) = patch.volume {
            self.volume = v;
        }
    }

    /// Replaces stored values that an update would have rejected with their
    /// defaults. Hand-edited or corrupted files must not reach the player.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            warn!(
                "Stored volume {} out of range, using {}",
                self.volume, defaults.volume
            );
            self.volume = defaults.volume;
        }
        if find_theme(&self.selected_theme_id).is_none() {
            let fallback = default_theme_for(self.theme_mode).id;
            warn!(
                "Unknown stored theme {:?}, using {}",
                self.selected_theme_id, fallback
            );
            self.selected_theme_id = fallback.to_string();
        }
        if !is_known_sound_id(&self.background_sound) {
            warn!(
                "Unknown stored sound {:?}, using {}",
                self.background_sound, NO_SOUND_ID
            );
            self.background_sound = NO_SOUND_ID.to_string();
        }
        self
    }
}

// ============================================================================
// SettingsStore
// ============================================================================

/// Returns the default settings file path (`<config dir>/uibo/prod-uibo-settings.json`).
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join("uibo")
            .join(format!("{SETTINGS_STORAGE_KEY}.json"))
    })
}

/// Persistent, observable settings.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    tx: watch::Sender<AppSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`.
    ///
    /// A missing file yields defaults. An unreadable or malformed file is
    /// logged and also yields defaults. Out-of-range or unknown stored values
    /// fall back to their defaults individually.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match read_settings(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("No settings file at {}, using defaults", path.display());
                AppSettings::default()
            }
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                AppSettings::default()
            }
        };
        let (tx, _rx) = watch::channel(settings);
        Self {
            path: Some(path),
            tx,
        }
    }

    /// Creates a store that never touches the filesystem.
    pub fn in_memory(settings: AppSettings) -> Self {
        let (tx, _rx) = watch::channel(settings);
        Self { path: None, tx }
    }

    /// Returns the settings file path, if persistent.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the current settings.
    pub fn get(&self) -> AppSettings {
        self.tx.borrow().clone()
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.tx.subscribe()
    }

    /// Validates and merges `patch`, then saves and publishes the result.
    ///
    /// Validation failures leave the settings untouched. Save failures are
    /// logged and the in-memory value is kept.
    pub fn update(&self, patch: SettingsPatch) -> Result<AppSettings, SettingsError> {
        patch.validate()?;
        let mut settings = self.get();
        settings.apply(patch);
        self.commit(settings.clone());
        Ok(settings)
    }

    /// Restores the default settings.
    pub fn reset(&self) -> AppSettings {
        let settings = AppSettings::default();
        self.commit(settings.clone());
        settings
    }

    fn commit(&self, settings: AppSettings) {
        if let Some(path) = &self.path {
            if let Err(e) = write_settings(path, &settings) {
                warn!("Failed to save settings: {}", e);
            }
        }
        self.tx.send_replace(settings);
    }
}

fn read_settings(path: &Path) -> Result<Option<AppSettings>, SettingsError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let settings: AppSettings = serde_json::from_str(&json)?;
    Ok(Some(settings.sanitized()))
}

fn write_settings(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(io_err)
}

// ============================================================================
// Tests
// ============================================================================
