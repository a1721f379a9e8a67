//! uibo library
//!
//! This library provides the core functionality behind the `uibo` binary:
//! - Countdown state, time formatting and IPC message types
//! - Timer engine, completion alert sequencer and cancellable scheduler
//! - Unix socket IPC server and client
//! - Settings store with change subscription
//! - Session task list
//! - Theme, ambient sound and preset catalogs
//! - Sound playback (alert and ambient loop) and desktop notifications
//! - CLI command parsing and display utilities

pub mod catalog;
pub mod cli;
pub mod daemon;
pub mod notification;
pub mod paths;
pub mod settings;
pub mod sound;
pub mod tasks;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_time, CountdownState, IpcRequest, IpcResponse, ResponseData, TimeParts, TimerPhase,
    TimerSnapshot,
};

pub use daemon::{
    AlertConfig, AlertSequencer, CompletionAlert, Repeat, Scheduler, TimerEngine, TimerEvent,
    TimerHandle,
};

pub use settings::{AppSettings, Language, SettingsError, SettingsPatch, SettingsStore};

pub use tasks::{Task, TaskError, TaskStore};

pub use notification::{
    MockNotifier, NotificationAction, NotificationContent, NotificationError, Notifier, Permission,
};

pub use sound::{MockSoundPlayer, SoundError, SoundPlayer, SoundSource};
