//! Completion alert sequencing.
//!
//! A completion starts an alert session: the alert sound plays right away
//! and then every `repeat_delay` until `repeat_count` plays were made, while
//! a notification is shown if the platform allows it. The session ends when
//! the repeat window runs out, the user clicks or dismisses the
//! notification, [`CompletionAlert::dismiss`] is called, or a newer
//! completion supersedes it.
//!
//! At most one session exists at a time. Repeat callbacks and the
//! notification task carry the id of the session that created them and do
//! nothing once that session is gone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::scheduler::{Repeat, Scheduler, TimerHandle};
use super::timer::CompletionAlert;
use crate::notification::{completion_content, Notifier, Permission};
use crate::settings::AppSettings;
use crate::sound::{SoundPlayer, SoundSource};

/// Repeat policy of an alert session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertConfig {
    /// Total number of plays, including the first
    pub repeat_count: u32,
    /// Delay between plays
    pub repeat_delay: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            repeat_count: 3,
            repeat_delay: Duration::from_millis(2500),
        }
    }
}

impl AlertConfig {
    /// How long a session lasts when nobody interacts with it.
    pub fn window(&self) -> Duration {
        self.repeat_delay * self.repeat_count
    }
}

struct AlertSession {
    id: u64,
    plays_remaining: u32,
    repeats: Option<TimerHandle>,
    /// Cancelled when the session ends; the notification task watches it
    ended: CancellationToken,
}

struct AlertShared<N> {
    player: Arc<dyn SoundPlayer>,
    notifier: Arc<N>,
    sound: SoundSource,
    config: AlertConfig,
    settings: watch::Receiver<AppSettings>,
    session: Mutex<Option<AlertSession>>,
    next_id: AtomicU64,
}

/// Plays the completion alert and shows its notification.
pub struct AlertSequencer<N> {
    shared: Arc<AlertShared<N>>,
    scheduler: Scheduler,
}

impl<N> Clone for AlertSequencer<N> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<N: Notifier> AlertSequencer<N> {
    /// Creates a sequencer. `settings` supplies the notification language.
    pub fn new(
        player: Arc<dyn SoundPlayer>,
        notifier: Arc<N>,
        sound: SoundSource,
        config: AlertConfig,
        settings: watch::Receiver<AppSettings>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            shared: Arc::new(AlertShared {
                player,
                notifier,
                sound,
                config,
                settings,
                session: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
            scheduler,
        }
    }

    /// Plays left in the active session.
    pub fn plays_remaining(&self) -> Option<u32> {
        self.shared.lock().as_ref().map(|s| s.plays_remaining)
    }

    fn start_session(&self) {
        let shared = &self.shared;
        let id = shared.next_id.fetch_add(1, Ordering::SeqCst);
        let ended = CancellationToken::new();

        if shared.end_session(None) {
            debug!("Superseding previous alert session");
        }

        {
            let mut guard = shared.lock();
            let mut session = AlertSession {
                id,
                plays_remaining: shared.config.repeat_count,
                repeats: None,
                ended: ended.clone(),
            };
            shared.play_once(&mut session);

            let weak = Arc::downgrade(shared);
            session.repeats = Some(self.scheduler.schedule_repeating(
                shared.config.repeat_delay,
                move || match weak.upgrade() {
                    Some(shared) => shared.repeat(id),
                    None => Repeat::Stop,
                },
            ));
            *guard = Some(session);
        }

        info!("Alert session {} started", id);
        let shared = shared.clone();
        self.scheduler.spawn(async move { shared.notify(id, ended).await });
    }
}

impl<N: Notifier> CompletionAlert for AlertSequencer<N> {
    fn trigger_completion(&self) {
        self.start_session();
    }

    fn dismiss(&self) {
        if self.shared.end_session(None) {
            info!("Alert dismissed");
        }
    }

    fn is_active(&self) -> bool {
        self.shared.lock().is_some()
    }
}

impl<N: Notifier> AlertShared<N> {
    fn lock(&self) -> MutexGuard<'_, Option<AlertSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Plays once. A failed play still uses up its turn.
    fn play_once(&self, session: &mut AlertSession) {
        session.plays_remaining = session.plays_remaining.saturating_sub(1);
        if let Err(e) = self.player.play(&self.sound) {
            warn!("Alert sound failed: {}", e);
        }
    }

    /// Ends the session with `id`, or whichever session is active for `None`.
    fn end_session(&self, id: Option<u64>) -> bool {
        let session = {
            let mut guard = self.lock();
            match guard.as_ref() {
                Some(s) if id.is_none_or(|id| s.id == id) => guard.take(),
                _ => None,
            }
        };
        let Some(session) = session else {
            return false;
        };

        if let Some(repeats) = &session.repeats {
            repeats.cancel();
        }
        session.ended.cancel();
        self.player.stop();
        debug!("Alert session {} ended", session.id);
        true
    }

    fn repeat(&self, id: u64) -> Repeat {
        {
            let mut guard = self.lock();
            let Some(session) = guard.as_mut().filter(|s| s.id == id) else {
                return Repeat::Stop;
            };
            if session.plays_remaining > 0 {
                self.play_once(session);
                return Repeat::Continue;
            }
        }

        // One delay after the last play: the window is over
        self.end_session(Some(id));
        Repeat::Stop
    }

    async fn notify(self: Arc<Self>, id: u64, ended: CancellationToken) {
        let permission = match self.notifier.permission() {
            Permission::Granted => Permission::Granted,
            Permission::Denied => {
                debug!("Notifications denied, alert is sound-only");
                return;
            }
            Permission::Default => {
                tokio::select! {
                    _ = ended.cancelled() => return,
                    permission = self.notifier.request_permission() => permission,
                }
            }
        };
        if permission != Permission::Granted || ended.is_cancelled() {
            return;
        }

        let language = self.settings.borrow().language;
        let mut shown = match self.notifier.show(&completion_content(language)) {
            Ok(shown) => shown,
            Err(e) => {
                warn!("Failed to show notification: {}", e);
                return;
            }
        };

        let action = tokio::select! {
            _ = ended.cancelled() => None,
            action = shown.actions.recv() => action,
        };
        match action {
            Some(action) => {
                info!("Notification {:?}, ending alert", action);
                self.end_session(Some(id));
            }
            None => ended.cancelled().await,
        }
        self.notifier.close(shown.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
