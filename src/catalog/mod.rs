//! Static catalogs: visual themes, ambient sounds and timer presets.

mod sounds;
mod themes;

pub use sounds::{find_ambient_sound, is_known_sound_id, AmbientSound, AMBIENT_SOUNDS, NO_SOUND_ID};
pub use themes::{
    default_theme_for, find_theme, resolve_theme, themes_for, Theme, ThemeKind, ThemeMode,
    ThemeStyles, THEMES,
};

/// One-click countdown durations, in minutes.
pub const PRESET_MINUTES: &[u32] = &[20, 30, 45, 60];

/// Largest hour value accepted by the custom duration input.
pub const MAX_CUSTOM_HOURS: u32 = 72;

/// Largest minute value accepted by the custom duration input.
pub const MAX_CUSTOM_MINUTES: u32 = 59;

/// Combines custom hour and minute inputs into total minutes.
///
/// Out-of-range inputs are clamped, not rejected. A result of zero means no
/// valid duration was entered.
#[must_use]
pub fn custom_duration_minutes(hours: Option<u32>, minutes: Option<u32>) -> u32 {
    let hours = hours.unwrap_or(0).min(MAX_CUSTOM_HOURS);
    let minutes = minutes.unwrap_or(0).min(MAX_CUSTOM_MINUTES);
    hours * 60 + minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(PRESET_MINUTES, &[20, 30, 45, 60]);
    }

    #[test]
    fn test_custom_duration() {
        assert_eq!(custom_duration_minutes(Some(1), Some(30)), 90);
        assert_eq!(custom_duration_minutes(None, Some(5)), 5);
        assert_eq!(custom_duration_minutes(Some(2), None), 120);
    }

    #[test]
    fn test_custom_duration_clamps() {
        assert_eq!(custom_duration_minutes(Some(100), Some(75)), 72 * 60 + 59);
    }

    #[test]
    fn test_custom_duration_empty_is_zero() {
        assert_eq!(custom_duration_minutes(None, None), 0);
        assert_eq!(custom_duration_minutes(Some(0), Some(0)), 0);
    }
}
