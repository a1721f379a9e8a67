//! Command definitions for the uibo CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::catalog::{custom_duration_minutes, ThemeMode, PRESET_MINUTES};
use crate::paths::SOCKET_ENV;
use crate::settings::{Language, SettingsPatch};

// ============================================================================
// CLI Structure
// ============================================================================

/// uibo - a focus countdown timer with a background daemon
#[derive(Parser, Debug)]
#[command(
    name = "uibo",
    version,
    about = "Focus countdown timer",
    long_about = "A countdown timer for focused work sessions.\n\
                  Run `uibo daemon` once, then drive it with the other subcommands.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path
    #[arg(long, global = true, env = SOCKET_ENV, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a countdown
    Start(StartArgs),

    /// Pause or resume the countdown
    #[command(visible_aliases = ["pause", "resume"])]
    Toggle,

    /// Restore the countdown to its starting duration
    Reset,

    /// Clear the countdown
    Stop {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the countdown
    Status {
        /// Redraw every second until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Silence the completion alert
    Dismiss,

    /// Manage the session task list
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// List the available themes
    Themes {
        /// Only show themes for this mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// List the ambient sounds
    Sounds,

    /// List the preset durations
    Presets,

    /// Run the daemon in the foreground
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Start Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Duration in minutes
    #[arg(conflicts_with_all = ["hours", "minutes", "preset"])]
    pub duration: Option<u32>,

    /// Hours of a custom duration (clamped to 0-72)
    #[arg(short = 'H', long)]
    pub hours: Option<u32>,

    /// Minutes of a custom duration (clamped to 0-59)
    #[arg(short, long)]
    pub minutes: Option<u32>,

    /// One of the preset durations (20, 30, 45, 60)
    #[arg(short, long, value_parser = parse_preset, conflicts_with_all = ["hours", "minutes"])]
    pub preset: Option<u32>,
}

impl StartArgs {
    /// Total minutes requested. Zero when nothing was given.
    pub fn total_minutes(&self) -> u32 {
        if let Some(minutes) = self.duration.or(self.preset) {
            return minutes;
        }
        custom_duration_minutes(self.hours, self.minutes)
    }
}

// ============================================================================
// Task Commands
// ============================================================================

/// Task list subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task
    Add {
        /// Task description
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List the tasks
    #[command(visible_alias = "ls")]
    List,

    /// Mark a task done or not done
    Toggle {
        /// Task id, as shown by `task list`
        id: Uuid,
    },

    /// Remove a task
    #[command(visible_alias = "rm")]
    Delete {
        /// Task id, as shown by `task list`
        id: Uuid,
    },
}

// ============================================================================
// Settings Commands
// ============================================================================

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Change one or more settings
    Set(SettingsSetArgs),

    /// Restore the default settings
    Reset,
}

/// Fields accepted by `settings set`.
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = true)]
pub struct SettingsSetArgs {
    #[arg(long, value_name = "BOOL")]
    pub mini_mode: Option<bool>,

    /// Ask before `stop` clears the countdown
    #[arg(long, value_name = "BOOL")]
    pub confirm_on_stop: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub always_on_top: Option<bool>,

    /// Notification language
    #[arg(long, value_enum)]
    pub language: Option<LanguageArg>,

    /// Color mode; picks the mode's default theme unless --theme is given
    #[arg(long, value_enum)]
    pub theme_mode: Option<ModeArg>,

    /// Theme id, see `uibo themes`
    #[arg(long, value_name = "ID")]
    pub theme: Option<String>,

    /// Ambient sound id, see `uibo sounds`
    #[arg(long, value_name = "ID")]
    pub sound: Option<String>,

    /// Ambient sound volume (0.0-1.0)
    #[arg(long)]
    pub volume: Option<f32>,
}

impl SettingsSetArgs {
    /// Converts the flags into a settings patch.
    pub fn into_patch(self) -> SettingsPatch {
        SettingsPatch {
            start_in_mini_mode: self.mini_mode,
            confirm_on_stop: self.confirm_on_stop,
            always_on_top: self.always_on_top,
            language: self.language.map(Into::into),
            theme_mode: self.theme_mode.map(Into::into),
            selected_theme_id: self.theme,
            background_sound: self.sound,
            volume: self.volume,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageArg {
    Es,
    En,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Es => Language::Es,
            LanguageArg::En => Language::En,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Light,
    Dark,
}

impl From<ModeArg> for ThemeMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Light => ThemeMode::Light,
            ModeArg::Dark => ThemeMode::Dark,
        }
    }
}

// ============================================================================
// Daemon Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH", env = "UIBO_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Keep settings in memory only
    #[arg(long, conflicts_with = "settings")]
    pub no_persist: bool,

    /// Directory holding alert.mp3 and the ambient sound files
    #[arg(long, value_name = "DIR")]
    pub sounds_dir: Option<PathBuf>,

    /// Do not open an audio device
    #[arg(long)]
    pub mute: bool,

    /// Do not show desktop notifications
    #[arg(long)]
    pub no_notifications: bool,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Accepts only the preset durations.
fn parse_preset(s: &str) -> Result<u32, String> {
    let minutes: u32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if PRESET_MINUTES.contains(&minutes) {
        Ok(minutes)
    } else {
        let presets: Vec<String> = PRESET_MINUTES.iter().map(u32::to_string).collect();
        Err(format!("presets are {}", presets.join(", ")))
    }
}

// ============================================================================
// Tests
// ============================================================================
