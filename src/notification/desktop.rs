//! Desktop notifications through `notify-rust`.
//!
//! Desktop notification servers have no permission prompt, so a notifier
//! that is enabled reports [`Permission::Granted`] and a disabled one
//! reports [`Permission::Denied`]. On freedesktop systems the user's click
//! or dismissal is reported back through a blocking `wait_for_response`
//! thread, and closing replaces the notification with one that expires at
//! once. Elsewhere no interaction is reported and notifications are left to
//! expire on their own.

use std::future::Future;
use std::time::Duration;

use notify_rust::{Notification, Timeout};
#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::{CloseReason, NotificationResponse};
use tokio::sync::mpsc;
use tracing::debug;
#[cfg(all(unix, not(target_os = "macos")))]
use tracing::warn;

use super::{
    NotificationAction, NotificationContent, NotificationError, Notifier, Permission,
    ShownNotification,
};

/// Application name shown by the notification server.
pub const APP_NAME: &str = "uibo";

/// Timeout of the replacement shown by [`DesktopNotifier::close`].
/// Zero would mean "never expire" to the server.
#[cfg(all(unix, not(target_os = "macos")))]
const CLOSE_TIMEOUT_MS: u32 = 1;

/// Notifier backed by the desktop notification server.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    enabled: bool,
    timeout: Duration,
}

impl DesktopNotifier {
    /// Creates a notifier whose notifications expire after `timeout`.
    pub fn new(enabled: bool, timeout: Duration) -> Self {
        Self { enabled, timeout }
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> Permission {
        if self.enabled {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn request_permission(&self) -> impl Future<Output = Permission> + Send {
        std::future::ready(self.permission())
    }

    fn show(&self, content: &NotificationContent) -> Result<ShownNotification, NotificationError> {
        if !self.enabled {
            return Err(NotificationError::Disabled);
        }

        let timeout_ms = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let mut notification = Notification::new();
        notification
            .summary(&content.title)
            .body(&content.body)
            .appname(APP_NAME)
            .icon("alarm-clock")
            .timeout(Timeout::Milliseconds(timeout_ms));

        #[cfg(all(unix, not(target_os = "macos")))]
        notification
            .urgency(notify_rust::Urgency::Critical)
            .action("default", "OK");

        let handle = notification
            .show()
            .map_err(|e| NotificationError::ShowFailed(e.to_string()))?;

        let (tx, actions) = mpsc::unbounded_channel();

        #[cfg(all(unix, not(target_os = "macos")))]
        let id = {
            let id = handle.id();
            std::thread::Builder::new()
                .name("uibo-notification".to_string())
                .spawn(move || {
                    let result = handle.wait_for_response(|response: &NotificationResponse| {
                        if let Some(action) = action_for(response) {
                            let _ = tx.send(action);
                        }
                    });
                    if let Err(e) = result {
                        debug!("Stopped waiting for notification {}: {}", id, e);
                    }
                })
                .map_err(|e| NotificationError::ShowFailed(e.to_string()))?;
            id
        };

        #[cfg(not(all(unix, not(target_os = "macos"))))]
        let id = {
            drop(handle);
            drop(tx);
            0
        };

        debug!("Desktop notification {} shown", id);
        Ok(ShownNotification { id, actions })
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn close(&self, id: u32) {
        if !self.enabled || id == 0 {
            return;
        }
        // Replacing keeps the id, so the waiting thread sees an expiry and exits
        let result = Notification::new()
            .id(id)
            .appname(APP_NAME)
            .summary(" ")
            .timeout(Timeout::Milliseconds(CLOSE_TIMEOUT_MS))
            .show();
        match result {
            Ok(_) => debug!("Desktop notification {} closed", id),
            Err(e) => warn!("Failed to close desktop notification {}: {}", id, e),
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn close(&self, id: u32) {
        debug!("Desktop notification {} left to expire", id);
    }
}

/// Maps a server response to a user action.
///
/// Only a close the user asked for counts as a dismissal. Expiry and
/// programmatic closes are not user input and must not end the alert.
#[cfg(all(unix, not(target_os = "macos")))]
fn action_for(response: &NotificationResponse) -> Option<NotificationAction> {
    match response {
        NotificationResponse::Default | NotificationResponse::Action(_) => {
            Some(NotificationAction::Clicked)
        }
        NotificationResponse::Closed(CloseReason::Dismissed) => Some(NotificationAction::Dismissed),
        NotificationResponse::Closed(_) | NotificationResponse::Reply(_) => None,
    }
}
