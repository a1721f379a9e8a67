//! System notifications for countdown completion.
//!
//! This module provides:
//!
//! - The [`Notifier`] trait: permission state, an async permission request,
//!   and display/close of a single notification
//! - A desktop backend built on `notify-rust`
//! - A mock backend for tests
//!
//! A shown notification reports user interaction (click or dismissal)
//! through the channel in [`ShownNotification`].

mod content;
mod desktop;
mod error;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

pub use content::{completion_content, NotificationContent};
pub use desktop::{DesktopNotifier, APP_NAME};
pub use error::NotificationError;

/// Notification permission, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; a request may be made
    #[default]
    Default,
}

/// User interaction with a shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Clicked,
    Dismissed,
}

/// A displayed notification.
#[derive(Debug)]
pub struct ShownNotification {
    /// Backend-assigned id, used for [`Notifier::close`]
    pub id: u32,
    /// Yields interactions. Closed without a value if the backend cannot
    /// report them.
    pub actions: mpsc::UnboundedReceiver<NotificationAction>,
}

/// Trait for notification backends.
pub trait Notifier: Send + Sync + 'static {
    /// Current permission state.
    fn permission(&self) -> Permission;

    /// Asks the user for permission and resolves with the outcome.
    fn request_permission(&self) -> impl Future<Output = Permission> + Send;

    /// Displays a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot display it.
    fn show(&self, content: &NotificationContent) -> Result<ShownNotification, NotificationError>;

    /// Removes a displayed notification. Unknown ids are ignored.
    ///
    /// Best effort: a backend that cannot withdraw notifications leaves them
    /// to expire. Closing must not be reported back as a user dismissal.
    fn close(&self, id: u32);
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Mock notifier for testing.
#[derive(Debug)]
pub struct MockNotifier {
    permission: Mutex<Permission>,
    request_result: Mutex<Permission>,
    request_delay: Mutex<Duration>,
    should_fail: AtomicBool,
    next_id: AtomicU32,
    shown: Mutex<Vec<(u32, NotificationContent)>>,
    closed: Mutex<Vec<u32>>,
    senders: Mutex<HashMap<u32, mpsc::UnboundedSender<NotificationAction>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new(Permission::Granted)
    }
}

impl MockNotifier {
    /// Creates a mock with the given permission. Requests resolve to the
    /// same value until [`set_request_result`](Self::set_request_result).
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
            request_result: Mutex::new(permission),
            request_delay: Mutex::new(Duration::ZERO),
            should_fail: AtomicBool::new(false),
            next_id: AtomicU32::new(1),
            shown: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_request_result(&self, result: Permission) {
        *lock(&self.request_result) = result;
    }

    /// Delays permission requests, as a user deciding would.
    pub fn set_request_delay(&self, delay: Duration) {
        *lock(&self.request_delay) = delay;
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn shown(&self) -> Vec<(u32, NotificationContent)> {
        lock(&self.shown).clone()
    }

    #[must_use]
    pub fn closed(&self) -> Vec<u32> {
        lock(&self.closed).clone()
    }

    /// Delivers an interaction to a shown notification.
    ///
    /// Returns false if the notification is unknown or its receiver is gone.
    pub fn simulate_action(&self, id: u32, action: NotificationAction) -> bool {
        lock(&self.senders)
            .get(&id)
            .is_some_and(|tx| tx.send(action).is_ok())
    }
}

impl Notifier for MockNotifier {
    fn permission(&self) -> Permission {
        *lock(&self.permission)
    }

    fn request_permission(&self) -> impl Future<Output = Permission> + Send {
        let delay = *lock(&self.request_delay);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let result = *lock(&self.request_result);
            *lock(&self.permission) = result;
            result
        }
    }

    fn show(&self, content: &NotificationContent) -> Result<ShownNotification, NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::ShowFailed("Mock failure".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, actions) = mpsc::unbounded_channel();
        lock(&self.senders).insert(id, tx);
        lock(&self.shown).push((id, content.clone()));
        Ok(ShownNotification { id, actions })
    }

    fn close(&self, id: u32) {
        lock(&self.senders).remove(&id);
        lock(&self.closed).push(id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Language;

    #[tokio::test]
    async fn test_mock_request_updates_permission() {
        let notifier = MockNotifier::new(Permission::Default);
        notifier.set_request_result(Permission::Granted);

        assert_eq!(notifier.request_permission().await, Permission::Granted);
        assert_eq!(notifier.permission(), Permission::Granted);
    }

    #[test]
    fn test_mock_show_and_action() {
        let notifier = MockNotifier::default();
        let mut shown = notifier.show(&completion_content(Language::Es)).unwrap();

        assert!(notifier.simulate_action(shown.id, NotificationAction::Clicked));
        assert_eq!(shown.actions.try_recv().unwrap(), NotificationAction::Clicked);

        notifier.close(shown.id);
        assert_eq!(notifier.closed(), vec![shown.id]);
        assert!(!notifier.simulate_action(shown.id, NotificationAction::Clicked));
    }

    #[test]
    fn test_mock_failure() {
        let notifier = MockNotifier::default();
        notifier.set_should_fail(true);
        assert!(notifier.show(&completion_content(Language::En)).is_err());
        assert!(notifier.shown().is_empty());
    }
}
