//! Countdown timer engine.
//!
//! This module provides the core countdown functionality:
//! - Start, pause/resume, reset and stop transitions
//! - A one-second ticker per countdown, cancelled whenever the countdown is
//!   superseded
//! - Completion hand-off to the alert sequencer, exactly once per countdown
//! - Event publishing for observers

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::scheduler::{Repeat, Scheduler, TimerHandle};
use crate::types::{CountdownState, TimeParts};

/// Interval between countdown decrements.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// CompletionAlert
// ============================================================================

/// Receiver of countdown completions.
///
/// The engine only ever calls these methods; the alert implementation owns
/// all audio and notification resources.
pub trait CompletionAlert: Send + Sync {
    /// Starts a new alert session, superseding any active one.
    fn trigger_completion(&self);

    /// Ends the active alert session, if any.
    fn dismiss(&self);

    /// Returns true while an alert session is active.
    fn is_active(&self) -> bool;
}

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A countdown started
    Started {
        /// Countdown length
        total_seconds: u32,
    },
    /// The countdown was paused
    Paused {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// The countdown was resumed
    Resumed {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// The countdown reached zero
    Finished,
    /// The countdown was restored to its initial duration
    Reset {
        /// Remaining seconds after the reset
        remaining_seconds: u32,
    },
    /// The countdown was cleared
    Stopped,
}

// ============================================================================
// TimerEngine
// ============================================================================

struct EngineState {
    countdown: CountdownState,
    /// Incremented whenever the ticker is replaced or cancelled
    session: u64,
    ticker: Option<TimerHandle>,
}

struct Shared {
    state: Mutex<EngineState>,
    alert: Arc<dyn CompletionAlert>,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TimerEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}

/// Countdown engine. Cheap to clone; clones share one countdown.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Arc<Shared>,
    scheduler: Scheduler,
}

impl TimerEngine {
    /// Creates an idle engine.
    pub fn new(
        alert: Arc<dyn CompletionAlert>,
        events: mpsc::UnboundedSender<TimerEvent>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState {
                    countdown: CountdownState::new(),
                    session: 0,
                    ticker: None,
                }),
                alert,
                events,
            }),
            scheduler,
        }
    }

    /// Starts a countdown of `minutes`, superseding any current one.
    ///
    /// Non-positive (or overflowing) durations are ignored and return false.
    pub fn start(&self, minutes: i64) -> bool {
        let Some(seconds) = minutes
            .checked_mul(60)
            .filter(|s| *s > 0)
            .and_then(|s| u32::try_from(s).ok())
        else {
            debug!("Ignoring start with {} minutes", minutes);
            return false;
        };

        {
            let mut state = self.shared.lock();
            Self::cancel_ticker(&mut state);
            state.countdown.start(seconds);
            self.schedule_ticker(&mut state);
        }

        info!("Countdown started: {} seconds", seconds);
        self.shared.emit(TimerEvent::Started {
            total_seconds: seconds,
        });
        self.shared.alert.dismiss();
        true
    }

    /// Pauses a running countdown or resumes a paused one.
    ///
    /// Returns false when there is no time left to pause or resume.
    pub fn toggle_pause(&self) -> bool {
        let event = {
            let mut state = self.shared.lock();
            if !state.countdown.toggle_pause() {
                return false;
            }
            let remaining_seconds = state.countdown.remaining_seconds();
            if state.countdown.is_running() {
                self.schedule_ticker(&mut state);
                TimerEvent::Resumed { remaining_seconds }
            } else {
                Self::cancel_ticker(&mut state);
                TimerEvent::Paused { remaining_seconds }
            }
        };

        debug!("Countdown toggled: {:?}", event);
        self.shared.emit(event);
        true
    }

    /// Restores the last started duration without running it.
    pub fn reset(&self) {
        let remaining_seconds = {
            let mut state = self.shared.lock();
            Self::cancel_ticker(&mut state);
            state.countdown.reset();
            state.countdown.remaining_seconds()
        };

        info!("Countdown reset");
        self.shared.emit(TimerEvent::Reset { remaining_seconds });
        self.shared.alert.dismiss();
    }

    /// Clears the countdown entirely.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            Self::cancel_ticker(&mut state);
            state.countdown.stop();
        }

        info!("Countdown stopped");
        self.shared.emit(TimerEvent::Stopped);
        self.shared.alert.dismiss();
    }

    /// Advances the countdown by one second, as the ticker does.
    ///
    /// Returns true if this tick completed the countdown.
    pub fn tick(&self) -> bool {
        advance(&self.shared, None) == Advance::Completed
    }

    /// Returns a copy of the countdown state.
    pub fn snapshot(&self) -> CountdownState {
        self.shared.lock().countdown.clone()
    }

    /// Returns the remaining time split for display.
    pub fn time_parts(&self) -> TimeParts {
        self.shared.lock().countdown.time_parts()
    }

    fn cancel_ticker(state: &mut EngineState) {
        state.session += 1;
        if let Some(ticker) = state.ticker.take() {
            ticker.cancel();
        }
    }

    fn schedule_ticker(&self, state: &mut EngineState) {
        Self::cancel_ticker(state);
        let session = state.session;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);

        state.ticker = Some(self.scheduler.schedule_repeating(TICK_PERIOD, move || {
            match shared.upgrade().map(|shared| advance(&shared, Some(session))) {
                Some(Advance::Ticked) => Repeat::Continue,
                _ => Repeat::Stop,
            }
        }));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    /// Stale ticker, or nothing running
    Idle,
    Ticked,
    Completed,
}

/// Decrements the countdown once.
///
/// `session` is the ticker's session; a stale ticker is stopped without
/// touching the countdown. Manual ticks pass `None`.
fn advance(shared: &Shared, session: Option<u64>) -> Advance {
    let (remaining_seconds, completed) = {
        let mut state = shared.lock();
        if session.is_some_and(|s| s != state.session) || !state.countdown.is_running() {
            return Advance::Idle;
        }
        let completed = state.countdown.tick();
        if completed {
            TimerEngine::cancel_ticker(&mut state);
        }
        (state.countdown.remaining_seconds(), completed)
    };

    shared.emit(TimerEvent::Tick { remaining_seconds });
    if !completed {
        return Advance::Ticked;
    }

    info!("Countdown finished");
    shared.emit(TimerEvent::Finished);
    shared.alert.trigger_completion();
    Advance::Completed
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("countdown", &self.snapshot())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimerPhase;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::time::sleep;

    #[derive(Default)]
    struct CountingAlert {
        triggered: AtomicU32,
        dismissed: AtomicU32,
        active: AtomicBool,
    }

    impl CompletionAlert for CountingAlert {
        fn trigger_completion(&self) {
            self.triggered.fetch_add(1, Ordering::SeqCst);
            self.active.store(true, Ordering::SeqCst);
        }

        fn dismiss(&self) {
            self.dismissed.fetch_add(1, Ordering::SeqCst);
            self.active.store(false, Ordering::SeqCst);
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    fn create_engine() -> (
        TimerEngine,
        Arc<CountingAlert>,
        mpsc::UnboundedReceiver<TimerEvent>,
    ) {
        let alert = Arc::new(CountingAlert::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(alert.clone(), tx, Scheduler::current());
        (engine, alert, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    // ------------------------------------------------------------------------
    // Transition Tests
    // ------------------------------------------------------------------------

    mod transition_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_start() {
            let (engine, alert, mut rx) = create_engine();

            assert!(engine.start(25));

            let state = engine.snapshot();
            assert_eq!(state.remaining_seconds(), 1500);
            assert_eq!(state.initial_seconds(), 1500);
            assert!(state.is_running());
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::Started {
                    total_seconds: 1500
                }]
            );
            assert_eq!(alert.dismissed.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_start_non_positive_is_ignored() {
            let (engine, _alert, mut rx) = create_engine();

            assert!(!engine.start(0));
            assert!(!engine.start(-5));
            assert!(!engine.start(i64::MAX));

            assert_eq!(engine.snapshot(), CountdownState::new());
            assert!(drain(&mut rx).is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_start_then_reset() {
            let (engine, _alert, _rx) = create_engine();

            engine.start(45);
            engine.reset();

            let state = engine.snapshot();
            assert_eq!(state.remaining_seconds(), 45 * 60);
            assert!(!state.is_running());
        }

        #[tokio::test(start_paused = true)]
        async fn test_toggle_without_countdown() {
            let (engine, _alert, mut rx) = create_engine();
            assert!(!engine.toggle_pause());
            assert!(drain(&mut rx).is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_toggle_events() {
            let (engine, _alert, mut rx) = create_engine();
            engine.start(5);
            drain(&mut rx);

            assert!(engine.toggle_pause());
            assert!(engine.toggle_pause());

            assert_eq!(
                drain(&mut rx),
                vec![
                    TimerEvent::Paused {
                        remaining_seconds: 300
                    },
                    TimerEvent::Resumed {
                        remaining_seconds: 300
                    },
                ]
            );
            assert!(engine.snapshot().is_running());
        }

        #[tokio::test(start_paused = true)]
        async fn test_stop_from_every_phase() {
            for setup in 0..4 {
                let (engine, _alert, _rx) = create_engine();
                match setup {
                    1 => {
                        engine.start(3);
                    }
                    2 => {
                        engine.start(3);
                        engine.toggle_pause();
                    }
                    3 => {
                        engine.start(1);
                        for _ in 0..60 {
                            engine.tick();
                        }
                    }
                    _ => {}
                }

                engine.stop();
                let state = engine.snapshot();
                assert_eq!(state.remaining_seconds(), 0);
                assert_eq!(state.initial_seconds(), 0);
                assert!(!state.is_running());
                assert_eq!(state.phase(), TimerPhase::Idle);
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_manual_tick_completes_once() {
            let (engine, alert, _rx) = create_engine();
            engine.start(1);

            let completions = (0..70).filter(|_| engine.tick()).count();

            assert_eq!(completions, 1);
            assert_eq!(alert.triggered.load(Ordering::SeqCst), 1);
            assert_eq!(engine.snapshot().phase(), TimerPhase::Finished);
        }
    }

    // ------------------------------------------------------------------------
    // Ticker Tests
    // ------------------------------------------------------------------------

    mod ticker_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_one_minute_countdown_completes_once() {
            let (engine, alert, mut rx) = create_engine();
            engine.start(1);

            sleep(Duration::from_millis(60_500)).await;

            let state = engine.snapshot();
            assert_eq!(state.remaining_seconds(), 0);
            assert!(!state.is_running());
            assert_eq!(alert.triggered.load(Ordering::SeqCst), 1);

            let events = drain(&mut rx);
            let ticks = events
                .iter()
                .filter(|e| matches!(e, TimerEvent::Tick { .. }))
                .count();
            assert_eq!(ticks, 60);
            assert_eq!(events.last(), Some(&TimerEvent::Finished));

            // Nothing fires after completion
            sleep(Duration::from_secs(30)).await;
            assert_eq!(alert.triggered.load(Ordering::SeqCst), 1);
            assert!(drain(&mut rx).is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_pause_freezes_countdown() {
            let (engine, _alert, _rx) = create_engine();
            engine.start(20);

            sleep(Duration::from_millis(3_500)).await;
            assert_eq!(engine.snapshot().remaining_seconds(), 20 * 60 - 3);

            engine.toggle_pause();
            sleep(Duration::from_secs(30)).await;
            assert_eq!(engine.snapshot().remaining_seconds(), 20 * 60 - 3);

            engine.toggle_pause();
            sleep(Duration::from_millis(2_500)).await;
            assert_eq!(engine.snapshot().remaining_seconds(), 20 * 60 - 5);
        }

        #[tokio::test(start_paused = true)]
        async fn test_restart_supersedes_ticker() {
            let (engine, _alert, _rx) = create_engine();
            engine.start(10);
            sleep(Duration::from_millis(2_500)).await;

            engine.start(1);
            sleep(Duration::from_millis(10_500)).await;

            // A leftover ticker would make this decrease twice as fast
            assert_eq!(engine.snapshot().remaining_seconds(), 50);
        }

        #[tokio::test(start_paused = true)]
        async fn test_rapid_toggles_do_not_double_tick() {
            let (engine, _alert, _rx) = create_engine();
            engine.start(5);

            for _ in 0..10 {
                engine.toggle_pause();
            }
            sleep(Duration::from_millis(4_500)).await;

            assert_eq!(engine.snapshot().remaining_seconds(), 300 - 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_reset_stops_ticking() {
            let (engine, alert, _rx) = create_engine();
            engine.start(1);
            sleep(Duration::from_millis(5_500)).await;

            engine.reset();
            sleep(Duration::from_secs(120)).await;

            assert_eq!(engine.snapshot().remaining_seconds(), 60);
            assert_eq!(alert.triggered.load(Ordering::SeqCst), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_start_dismisses_ringing_alert() {
            let (engine, alert, _rx) = create_engine();
            engine.start(1);
            sleep(Duration::from_millis(60_500)).await;
            assert!(alert.is_active());

            engine.start(1);
            assert!(!alert.is_active());
        }

        #[tokio::test(start_paused = true)]
        async fn test_dropped_receiver_is_harmless() {
            let (engine, alert, rx) = create_engine();
            drop(rx);

            engine.start(1);
            sleep(Duration::from_millis(60_500)).await;

            assert_eq!(alert.triggered.load(Ordering::SeqCst), 1);
        }
    }
}
