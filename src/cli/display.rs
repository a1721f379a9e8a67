//! Display utilities for the uibo CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Countdown status (one-shot and watch mode)
//! - Tasks and settings
//! - Theme, sound and preset catalogs

use std::io::Write;

use crate::catalog::{
    resolve_theme, ThemeKind, ThemeMode, AMBIENT_SOUNDS, NO_SOUND_ID, PRESET_MINUTES, THEMES,
};
use crate::settings::AppSettings;
use crate::tasks::Task;
use crate::types::{format_time, IpcResponse, TimerPhase, TimerSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's message for a countdown command, followed by the
    /// remaining time when the response carries a snapshot.
    pub fn show_command_result(response: &IpcResponse) {
        println!("{}", response.message);
        if let Some(timer) = response.data.as_ref().and_then(|d| d.timer.as_ref()) {
            println!("  Remaining: {}", timer.display);
        }
    }

    /// Shows the current countdown status.
    pub fn show_status(response: &IpcResponse) {
        let Some(data) = &response.data else {
            println!("No countdown");
            return;
        };
        if let Some(timer) = &data.timer {
            println!("{}", Self::format_status(timer));
        }
        if data.alerting == Some(true) {
            println!("Alert ringing. Silence it with 'uibo dismiss'");
        }
    }

    /// Redraws the status line in place, for `status --watch`.
    pub fn show_watch_line(timer: &TimerSnapshot, alerting: bool) {
        let mut line = Self::format_status(timer);
        if alerting {
            line.push_str("  (ringing)");
        }
        let mut stdout = std::io::stdout().lock();
        // Pad to clear leftovers from a longer previous line
        let _ = write!(stdout, "\r{line:<40}");
        let _ = stdout.flush();
    }

    /// `HH:MM:SS  Label`, e.g. `00:24:59  Running`.
    pub fn format_status(timer: &TimerSnapshot) -> String {
        let time = format_time(timer.remaining_seconds);
        format!("{}  {}", time, Self::phase_label(timer))
    }

    fn phase_label(timer: &TimerSnapshot) -> &'static str {
        match timer.phase {
            TimerPhase::Idle => "Stopped",
            TimerPhase::Running => "Running",
            TimerPhase::Finished => "Time's up",
            TimerPhase::Ready if timer.remaining_seconds < timer.initial_seconds => "Paused",
            TimerPhase::Ready => "Ready",
        }
    }

    /// Shows the task list.
    pub fn show_tasks(tasks: &[Task]) {
        if tasks.is_empty() {
            println!("No tasks");
            return;
        }
        for task in tasks {
            println!("{}", Self::format_task(task));
        }
    }

    fn format_task(task: &Task) -> String {
        let mark = if task.completed { "x" } else { " " };
        format!("[{}] {}  {}", mark, task.text, task.id)
    }

    /// Shows the settings.
    pub fn show_settings(settings: &AppSettings) {
        for (key, value) in Self::settings_rows(settings) {
            println!("{key:<18}{value}");
        }
    }

    fn settings_rows(settings: &AppSettings) -> Vec<(&'static str, String)> {
        let theme = resolve_theme(&settings.selected_theme_id, settings.theme_mode);
        vec![
            ("Mini mode", settings.start_in_mini_mode.to_string()),
            ("Confirm on stop", settings.confirm_on_stop.to_string()),
            ("Always on top", settings.always_on_top.to_string()),
            ("Language", settings.language.as_str().to_string()),
            ("Theme mode", settings.theme_mode.as_str().to_string()),
            ("Theme", format!("{} ({})", theme.id, theme.name)),
            ("Sound", settings.background_sound.clone()),
            ("Volume", format!("{:.0}%", settings.volume * 100.0)),
        ]
    }

    /// Lists the themes, optionally for one mode only.
    pub fn show_themes(mode: Option<ThemeMode>) {
        for theme in THEMES.iter().filter(|t| mode.is_none_or(|m| t.mode == m)) {
            let kind = match theme.kind {
                ThemeKind::Static => "static",
                ThemeKind::Animated => "animated",
            };
            println!(
                "{:<18}{:<24}{:<7}{}",
                theme.id,
                theme.name,
                theme.mode.as_str(),
                kind
            );
        }
    }

    /// Lists the ambient sounds.
    pub fn show_sounds() {
        println!("{:<18}No sound", NO_SOUND_ID);
        for sound in AMBIENT_SOUNDS {
            println!("{:<18}{}", sound.id, sound.name);
        }
    }

    /// Lists the preset durations.
    pub fn show_presets() {
        for minutes in PRESET_MINUTES {
            println!("{:>3} min   uibo start --preset {}", minutes, minutes);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================
