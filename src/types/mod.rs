//! Core data types for the focus timer.
//!
//! This module defines the data structures used for:
//! - Countdown state and its derived phase
//! - Display formatting of remaining time
//! - IPC request/response serialization

mod time;

pub use time::{format_time, TimeParts};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::{AppSettings, SettingsPatch};
use crate::tasks::Task;

// ============================================================================
// TimerPhase
// ============================================================================

/// Phase of the countdown, derived from [`CountdownState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No countdown has been started (or it was stopped)
    #[default]
    Idle,
    /// A countdown is set but not running (paused or reset)
    Ready,
    /// The countdown is decrementing
    Running,
    /// The countdown reached zero
    Finished,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Ready => "ready",
            TimerPhase::Running => "running",
            TimerPhase::Finished => "finished",
        }
    }
}

// ============================================================================
// CountdownState
// ============================================================================

/// State of a single countdown.
///
/// `remaining_seconds <= initial_seconds` holds after every operation, and
/// `running` is only ever true while `remaining_seconds > 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    remaining_seconds: u32,
    initial_seconds: u32,
    running: bool,
}

impl CountdownState {
    /// Creates an idle countdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds left in the current countdown.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Duration of the most recently started countdown.
    pub fn initial_seconds(&self) -> u32 {
        self.initial_seconds
    }

    /// Returns true if the countdown is decrementing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begins a fresh countdown of `seconds`. Zero is ignored.
    pub fn start(&mut self, seconds: u32) {
        if seconds == 0 {
            return;
        }
        self.initial_seconds = seconds;
        self.remaining_seconds = seconds;
        self.running = true;
    }

    /// Flips between running and paused.
    ///
    /// Returns false (and changes nothing) when no time is left.
    pub fn toggle_pause(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            return false;
        }
        self.running = !self.running;
        true
    }

    /// Restores the last started duration without running it.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.initial_seconds;
    }

    /// Clears the countdown entirely.
    pub fn stop(&mut self) {
        self.running = false;
        self.remaining_seconds = 0;
        self.initial_seconds = 0;
    }

    /// Decrements the countdown by one second.
    ///
    /// Returns true only on the tick that brings the countdown to zero.
    /// Ticks while paused or finished are no-ops.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Returns the derived phase.
    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else if self.remaining_seconds > 0 {
            TimerPhase::Ready
        } else if self.initial_seconds > 0 {
            TimerPhase::Finished
        } else {
            TimerPhase::Idle
        }
    }

    /// Returns the remaining time split for display.
    pub fn time_parts(&self) -> TimeParts {
        format_time(self.remaining_seconds)
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// Serializable view of the countdown for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Derived phase
    pub phase: TimerPhase,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u32,
    /// Last started duration in seconds
    #[serde(rename = "initialSeconds")]
    pub initial_seconds: u32,
    /// Whether the countdown is decrementing
    pub running: bool,
    /// Remaining time as `HH:MM:SS`
    pub display: String,
}

impl From<&CountdownState> for TimerSnapshot {
    fn from(state: &CountdownState) -> Self {
        Self {
            phase: state.phase(),
            remaining_seconds: state.remaining_seconds(),
            initial_seconds: state.initial_seconds(),
            running: state.is_running(),
            display: state.time_parts().to_string(),
        }
    }
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Start a new countdown
    Start {
        /// Duration in minutes
        minutes: i64,
    },
    /// Pause or resume the countdown
    TogglePause,
    /// Restore the last started duration
    Reset,
    /// Clear the countdown
    Stop,
    /// Query the current status
    Status,
    /// Silence a ringing alert
    Dismiss,
    /// Append a task
    AddTask {
        /// Task description
        text: String,
    },
    /// Flip a task's completion flag
    ToggleTask {
        /// Task id
        id: Uuid,
    },
    /// Remove a task
    DeleteTask {
        /// Task id
        id: Uuid,
    },
    /// List all tasks
    ListTasks,
    /// Read the settings
    GetSettings,
    /// Merge a partial settings update
    UpdateSettings {
        /// Fields to change
        patch: SettingsPatch,
    },
    /// Restore default settings
    ResetSettings,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Countdown snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerSnapshot>,
    /// Whether a completion alert is ringing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerting: Option<bool>,
    /// Session tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    /// Current settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
}

impl ResponseData {
    /// Creates response data holding only a countdown snapshot.
    pub fn from_countdown(state: &CountdownState) -> Self {
        Self {
            timer: Some(TimerSnapshot::from(state)),
            ..Self::default()
        }
    }

    /// Creates response data holding only a task list.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Some(tasks),
            ..Self::default()
        }
    }

    /// Creates response data holding only settings.
    pub fn from_settings(settings: AppSettings) -> Self {
        Self {
            settings: Some(settings),
            ..Self::default()
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if the daemon reported success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerPhase Tests
    // ------------------------------------------------------------------------

    mod timer_phase_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(TimerPhase::default(), TimerPhase::Idle);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerPhase::Idle.as_str(), "idle");
            assert_eq!(TimerPhase::Ready.as_str(), "ready");
            assert_eq!(TimerPhase::Running.as_str(), "running");
            assert_eq!(TimerPhase::Finished.as_str(), "finished");
        }

        #[test]
        fn test_serialize() {
            let json = serde_json::to_string(&TimerPhase::Finished).unwrap();
            assert_eq!(json, "\"finished\"");
        }
    }

    // ------------------------------------------------------------------------
    // CountdownState Tests
    // ------------------------------------------------------------------------

    mod countdown_state_tests {
        use super::*;

        fn assert_invariants(state: &CountdownState) {
            assert!(state.remaining_seconds() <= state.initial_seconds());
            if state.is_running() {
                assert!(state.initial_seconds() > 0);
                assert!(state.remaining_seconds() > 0);
            }
        }

        #[test]
        fn test_new_is_idle() {
            let state = CountdownState::new();
            assert_eq!(state.remaining_seconds(), 0);
            assert_eq!(state.initial_seconds(), 0);
            assert!(!state.is_running());
            assert_eq!(state.phase(), TimerPhase::Idle);
        }

        #[test]
        fn test_start() {
            let mut state = CountdownState::new();
            state.start(300);

            assert_eq!(state.remaining_seconds(), 300);
            assert_eq!(state.initial_seconds(), 300);
            assert!(state.is_running());
            assert_eq!(state.phase(), TimerPhase::Running);
        }

        #[test]
        fn test_start_zero_is_ignored() {
            let mut state = CountdownState::new();
            state.start(0);
            assert_eq!(state, CountdownState::new());
        }

        #[test]
        fn test_start_supersedes_running_countdown() {
            let mut state = CountdownState::new();
            state.start(600);
            state.tick();
            state.start(60);

            assert_eq!(state.remaining_seconds(), 60);
            assert_eq!(state.initial_seconds(), 60);
        }

        #[test]
        fn test_start_then_reset() {
            for minutes in [1u32, 20, 45, 4379] {
                let mut state = CountdownState::new();
                state.start(minutes * 60);
                state.reset();

                assert_eq!(state.remaining_seconds(), minutes * 60);
                assert!(!state.is_running());
                assert_eq!(state.phase(), TimerPhase::Ready);
            }
        }

        #[test]
        fn test_toggle_twice_restores_running() {
            let mut state = CountdownState::new();
            state.start(5 * 60);

            assert!(state.toggle_pause());
            assert!(!state.is_running());
            assert_eq!(state.phase(), TimerPhase::Ready);

            assert!(state.toggle_pause());
            assert!(state.is_running());
            assert_eq!(state.remaining_seconds(), 5 * 60);
        }

        #[test]
        fn test_toggle_without_time_is_noop() {
            let mut state = CountdownState::new();
            assert!(!state.toggle_pause());
            assert!(!state.is_running());
        }

        #[test]
        fn test_tick_while_paused_is_noop() {
            let mut state = CountdownState::new();
            state.start(20 * 60);
            state.toggle_pause();

            assert!(!state.tick());
            assert_eq!(state.remaining_seconds(), 20 * 60);
        }

        #[test]
        fn test_tick_to_zero_completes_once() {
            let mut state = CountdownState::new();
            state.start(60);

            let mut completions = 0;
            for _ in 0..75 {
                if state.tick() {
                    completions += 1;
                }
                assert_invariants(&state);
            }

            assert_eq!(completions, 1);
            assert_eq!(state.remaining_seconds(), 0);
            assert!(!state.is_running());
            assert_eq!(state.phase(), TimerPhase::Finished);
        }

        #[test]
        fn test_reset_from_finished_is_ready() {
            let mut state = CountdownState::new();
            state.start(2);
            state.tick();
            state.tick();
            assert_eq!(state.phase(), TimerPhase::Finished);

            state.reset();
            assert_eq!(state.phase(), TimerPhase::Ready);
            assert_eq!(state.remaining_seconds(), 2);
        }

        #[test]
        fn test_stop_from_any_phase() {
            let mut running = CountdownState::new();
            running.start(90);

            let mut paused = running.clone();
            paused.toggle_pause();

            let mut finished = CountdownState::new();
            finished.start(1);
            finished.tick();

            for mut state in [CountdownState::new(), running, paused, finished] {
                state.stop();
                assert_eq!(state.remaining_seconds(), 0);
                assert_eq!(state.initial_seconds(), 0);
                assert!(!state.is_running());
                assert_eq!(state.phase(), TimerPhase::Idle);
            }
        }

        #[test]
        fn test_time_parts() {
            let mut state = CountdownState::new();
            state.start(61);
            assert_eq!(state.time_parts().to_string(), "00:01:01");
        }
    }

    // ------------------------------------------------------------------------
    // IPC Type Tests
    // ------------------------------------------------------------------------

    mod ipc_type_tests {
        use super::*;

        #[test]
        fn test_start_request_wire_format() {
            let json = serde_json::to_string(&IpcRequest::Start { minutes: 25 }).unwrap();
            assert_eq!(json, r#"{"command":"start","minutes":25}"#);
        }

        #[test]
        fn test_unit_request_wire_format() {
            let json = serde_json::to_string(&IpcRequest::TogglePause).unwrap();
            assert_eq!(json, r#"{"command":"toggle_pause"}"#);
        }

        #[test]
        fn test_parse_task_request() {
            let id = Uuid::new_v4();
            let json = format!(r#"{{"command":"delete_task","id":"{id}"}}"#);
            let request: IpcRequest = serde_json::from_str(&json).unwrap();
            assert!(matches!(request, IpcRequest::DeleteTask { id: parsed } if parsed == id));
        }

        #[test]
        fn test_snapshot_from_state() {
            let mut state = CountdownState::new();
            state.start(90);
            let snapshot = TimerSnapshot::from(&state);

            assert_eq!(snapshot.phase, TimerPhase::Running);
            assert_eq!(snapshot.remaining_seconds, 90);
            assert_eq!(snapshot.display, "00:01:30");
        }

        #[test]
        fn test_response_omits_empty_data() {
            let response = IpcResponse::success("ok", Some(ResponseData::default()));
            let json = serde_json::to_string(&response).unwrap();
            assert_eq!(json, r#"{"status":"success","message":"ok","data":{}}"#);
        }

        #[test]
        fn test_error_response() {
            let response = IpcResponse::error("boom");
            assert!(!response.is_success());
            assert!(response.data.is_none());
        }
    }
}
