//! Notification system error types.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification backend refused or failed to display.
    #[error("failed to show notification: {0}")]
    ShowFailed(String),

    /// Notifications are turned off for this process.
    #[error("notifications are disabled")]
    Disabled,
}
