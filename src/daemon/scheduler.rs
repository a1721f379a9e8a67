//! Cancellable wall-clock scheduling on top of the tokio runtime.
//!
//! Every repeating callback gets a [`TimerHandle`]. Cancelling the handle
//! guarantees that the callback is not invoked again, which is what keeps a
//! superseded countdown or alert session from producing duplicate ticks or
//! duplicate sounds.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Whether a repeating callback wants to run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Continue,
    Stop,
}

/// Handle to a scheduled callback.
///
/// Dropping the handle does not cancel the callback.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Cancels the callback. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once cancelled or finished.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Schedules callbacks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    /// Uses the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Calls `callback` every `period`, first one period from now, until it
    /// returns [`Repeat::Stop`] or the handle is cancelled.
    ///
    /// Ticks missed while the runtime was busy are skipped, not replayed.
    pub fn schedule_repeating<F>(&self, period: Duration, mut callback: F) -> TimerHandle
    where
        F: FnMut() -> Repeat + Send + 'static,
    {
        let timer = TimerHandle::default();
        let token = timer.token.clone();

        self.handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if token.is_cancelled() {
                    break;
                }
                if callback() == Repeat::Stop {
                    token.cancel();
                    break;
                }
            }
            trace!("Repeating callback finished");
        });

        timer
    }

    /// Runs a future on the scheduler's runtime.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}
