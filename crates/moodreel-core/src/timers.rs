//! Background tasks driving the tracker: the 1 s break countdown and the
//! midnight reset.
//!
//! Both tasks lock the shared tracker for every step, so callbacks for the
//! same budget never interleave. Handles abort their task when cancelled,
//! re-armed or dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::clock::Clock;
use crate::tracker::UsageTracker;

pub type SharedTracker = Arc<Mutex<UsageTracker>>;

const BREAK_TICK: Duration = Duration::from_secs(1);

/// Counts an active break down once per second
#[derive(Debug, Default)]
pub struct BreakTicker {
    handle: Option<JoinHandle<()>>,
}

impl BreakTicker {
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Spawn the countdown, replacing any countdown already running.
    ///
    /// The task exits by itself once the break finishes or is cleared.
    pub fn start(&mut self, tracker: SharedTracker) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval(BREAK_TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticks.tick().await;

            loop {
                ticks.tick().await;
                let mut guard = tracker.lock().await;
                if !guard.is_on_break() {
                    log::debug!("Break cleared, stopping ticker");
                    break;
                }
                if guard.tick_break(1) {
                    log::info!("Break finished");
                    break;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for BreakTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Resets usage at each local midnight.
///
/// The delay is recomputed from the clock after every firing instead of
/// repeating a fixed 24 h period. The system clock measures it in real time
/// across DST changes, and a late wake-up still resets on the new date.
#[derive(Debug, Default)]
pub struct MidnightScheduler {
    handle: Option<JoinHandle<()>>,
}

impl MidnightScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Arm the timer, aborting a previously armed one.
    ///
    /// Returns the delay in milliseconds until the first firing.
    pub fn arm(&mut self, tracker: SharedTracker, clock: Arc<dyn Clock>) -> u64 {
        self.cancel();
        let first_delay = clock.millis_until_next_midnight();
        log::debug!("Midnight reset armed in {first_delay} ms");

        self.handle = Some(tokio::spawn(async move {
            let mut delay = first_delay;
            loop {
                sleep(Duration::from_millis(delay.max(1))).await;
                let reset = tracker.lock().await.reset_if_new_day();
                if !reset {
                    log::debug!("Midnight timer fired before the date changed");
                }
                delay = clock.millis_until_next_midnight();
            }
        }));
        first_delay
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for MidnightScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
