//! Display formatting for countdown durations.

use serde::{Deserialize, Serialize};

/// Zero-padded hour/minute/second components of a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    /// Hours, at least two digits
    pub hours: String,
    /// Minutes (00-59)
    pub minutes: String,
    /// Seconds (00-59)
    pub seconds: String,
}

impl std::fmt::Display for TimeParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

/// Splits a number of seconds into zero-padded display parts.
///
/// Hours are not wrapped: durations of 100 hours or more produce a
/// three-digit hour field.
#[must_use]
pub fn format_time(total_seconds: u32) -> TimeParts {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    TimeParts {
        hours: format!("{hours:02}"),
        minutes: format!("{minutes:02}"),
        seconds: format!("{seconds:02}"),
    }
}
