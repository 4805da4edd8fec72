//! Usage Budget Tracker - day-scoped usage counter and break countdown.
//!
//! The tracker owns a [`UsageBudget`], derives the usage ratio and tier from it,
//! and writes it back to the key-value store after every mutation. Writes are
//! best effort: a failed write is reported to the event sink and the in-memory
//! state stays authoritative for the session.

use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;

use moodreel_storage::KeyValueStore;

use crate::budget::{UsageBudget, UsageTier, DEFAULT_DAILY_LIMIT_MINUTES};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::events::{EventSink, ResetReason, TrackerEvent};
use crate::persist;


/// Store key holding the serialized budget
pub const BUDGET_KEY: &str = "timeControl";

/// Tuning knobs for a tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerOptions {
    /// Limit applied when nothing has been persisted yet
    pub default_daily_limit_minutes: u32,
    /// Usage fraction above which the home feed shows the time warning banner
    pub time_warning_ratio: f64,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            default_daily_limit_minutes: DEFAULT_DAILY_LIMIT_MINUTES,
            time_warning_ratio: 0.8,
        }
    }
}

/// Point-in-time view of the tracker for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub budget: UsageBudget,
    pub usage_ratio: f64,
    pub display_ratio: f64,
    pub tier: UsageTier,
    pub suggestion: &'static str,
    pub on_break: bool,
    pub show_time_warning: bool,
}

pub struct UsageTracker {
    budget: UsageBudget,
    options: TrackerOptions,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl UsageTracker {
    /// Load the persisted budget, falling back to a fresh one.
    ///
    /// Loading never resets usage by itself; call [`Self::reset_if_new_day`]
    /// afterwards, as the session controller does.
    #[must_use]
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
        options: TrackerOptions,
    ) -> Self {
        let budget = match store.get(BUDGET_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UsageBudget>(&raw) {
                Ok(budget) if budget.daily_limit_minutes > 0 => Some(budget),
                Ok(_) => {
                    log::warn!("Stored budget has a zero daily limit, using defaults");
                    None
                }
                Err(e) => {
                    log::warn!("Failed to parse stored budget: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::error!("Failed to load stored budget: {e}");
                None
            }
        };

        let budget = budget.unwrap_or_else(|| {
            UsageBudget::new(options.default_daily_limit_minutes.max(1), clock.today())
        });

        log::debug!(
            "Loaded budget: {}/{} minutes, last reset {:?}",
            budget.current_usage_minutes,
            budget.daily_limit_minutes,
            budget.last_reset_date
        );

        Self {
            budget,
            options,
            store,
            clock,
            events,
        }
    }

    #[must_use]
    pub const fn budget(&self) -> &UsageBudget {
        &self.budget
    }

    /// `current / limit`, unbounded above
    #[must_use]
    pub fn compute_usage_ratio(&self) -> f64 {
        self.budget.usage_ratio()
    }

    /// Usage ratio clamped to `[0, 1]` for progress bars
    #[must_use]
    pub fn display_ratio(&self) -> f64 {
        self.compute_usage_ratio().clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn tier(&self) -> UsageTier {
        UsageTier::classify(self.compute_usage_ratio())
    }

    /// Home feed warning rule: usage strictly above the warning fraction of the limit
    #[must_use]
    pub fn should_show_time_warning(&self) -> bool {
        f64::from(self.budget.current_usage_minutes)
            > f64::from(self.budget.daily_limit_minutes) * self.options.time_warning_ratio
    }

    #[must_use]
    pub const fn is_on_break(&self) -> bool {
        self.budget.is_on_break()
    }

    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        let tier = self.tier();
        UsageSnapshot {
            budget: self.budget.clone(),
            usage_ratio: self.compute_usage_ratio(),
            display_ratio: self.display_ratio(),
            tier,
            suggestion: tier.suggestion(),
            on_break: self.is_on_break(),
            show_time_warning: self.should_show_time_warning(),
        }
    }

    /// Start (or restart) a break of `duration_minutes`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `duration_minutes` is zero; state is left unchanged
    pub fn start_break(&mut self, duration_minutes: u32) -> Result<(), CoreError> {
        if duration_minutes == 0 {
            return Err(CoreError::invalid("duration_minutes", "positive", duration_minutes));
        }
        let seconds = duration_minutes.saturating_mul(60);
        if self.is_on_break() {
            log::debug!(
                "Replacing active break with {} seconds remaining",
                self.budget.break_remaining_seconds
            );
        }
        self.budget.break_remaining_seconds = seconds;
        self.budget.break_ends_at =
            Some(self.clock.now_local() + Duration::seconds(i64::from(seconds)));
        self.events.emit(&TrackerEvent::BreakStarted { seconds });
        self.persist();
        Ok(())
    }

    /// Count down `elapsed_seconds` of an active break.
    ///
    /// Returns `true` when this call finished the break.
    pub fn tick_break(&mut self, elapsed_seconds: u32) -> bool {
        if !self.is_on_break() || elapsed_seconds == 0 {
            return false;
        }
        self.budget.break_remaining_seconds = self
            .budget
            .break_remaining_seconds
            .saturating_sub(elapsed_seconds);
        let finished = !self.is_on_break();
        if finished {
            self.budget.break_ends_at = None;
            self.events.emit(&TrackerEvent::BreakFinished);
        }
        self.persist();
        finished
    }

    /// Drop an active break without finishing it
    pub fn cancel_break(&mut self) {
        if !self.is_on_break() {
            return;
        }
        let remaining_seconds = self.budget.break_remaining_seconds;
        self.budget.break_remaining_seconds = 0;
        self.budget.break_ends_at = None;
        self.events.emit(&TrackerEvent::BreakCancelled { remaining_seconds });
        self.persist();
    }

    /// Count down the part of a break that elapsed while no ticker was running.
    ///
    /// The remaining time is taken from the stored end time and never grows.
    /// Returns `true` when the break ran out in the meantime.
    pub fn catch_up_break(&mut self) -> bool {
        if !self.is_on_break() {
            if self.budget.break_ends_at.take().is_some() {
                self.persist();
            }
            return false;
        }
        let now = self.clock.now_local();
        let Some(ends_at) = self.budget.break_ends_at else {
            // Stored without an end time: count the remainder from now
            let remaining = i64::from(self.budget.break_remaining_seconds);
            self.budget.break_ends_at = Some(now + Duration::seconds(remaining));
            self.persist();
            return false;
        };
        let left = u32::try_from((ends_at - now).num_seconds().max(0)).unwrap_or(u32::MAX);
        let remaining = self.budget.break_remaining_seconds;
        if left >= remaining {
            return false;
        }
        log::debug!("Break advanced {}s while no countdown was running", remaining - left);
        self.tick_break(remaining - left)
    }

    /// Replace the daily limit
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `minutes` is zero; state is left unchanged
    pub fn set_daily_limit(&mut self, minutes: u32) -> Result<(), CoreError> {
        if minutes == 0 {
            return Err(CoreError::invalid("daily_limit_minutes", "positive", minutes));
        }
        let before = self.tier();
        self.budget.daily_limit_minutes = minutes;
        self.events.emit(&TrackerEvent::DailyLimitChanged { minutes });
        self.emit_tier_change(before);
        self.persist();
        Ok(())
    }

    /// Add `minutes` of foreground usage
    pub fn record_usage(&mut self, minutes: u32) {
        if minutes == 0 {
            return;
        }
        let before = self.tier();
        self.budget.current_usage_minutes =
            self.budget.current_usage_minutes.saturating_add(minutes);
        self.events.emit(&TrackerEvent::UsageRecorded {
            minutes,
            total_minutes: self.budget.current_usage_minutes,
        });
        self.emit_tier_change(before);
        self.persist();
    }

    /// Manual reset of today's usage
    pub fn reset_daily_usage(&mut self) {
        self.reset(ResetReason::Manual);
    }

    /// Reset usage if a local midnight has passed since the last reset.
    ///
    /// Compares the stored reset date with the clock's date, so it is correct
    /// no matter how long the process was suspended. Returns whether a reset
    /// happened.
    pub fn reset_if_new_day(&mut self) -> bool {
        let today = self.clock.today();
        match self.budget.last_reset_date {
            Some(last) if last >= today => false,
            Some(last) => {
                log::info!("Day rolled over ({last} -> {today}), resetting usage");
                self.reset(ResetReason::DayRollover);
                true
            }
            None => {
                // Records from before the date stamp existed: adopt today without wiping usage
                self.budget.last_reset_date = Some(today);
                self.persist();
                false
            }
        }
    }

    /// Delay until the next local midnight according to this tracker's clock
    #[must_use]
    pub fn millis_until_next_midnight(&self) -> u64 {
        self.clock.millis_until_next_midnight()
    }

    fn reset(&mut self, reason: ResetReason) {
        let before = self.tier();
        let previous_minutes = self.budget.current_usage_minutes;
        self.budget.current_usage_minutes = 0;
        self.budget.last_reset_date = Some(self.clock.today());
        self.events.emit(&TrackerEvent::UsageReset {
            reason,
            previous_minutes,
        });
        self.emit_tier_change(before);
        self.persist();
    }

    fn emit_tier_change(&self, before: UsageTier) {
        let after = self.tier();
        if after != before {
            self.events.emit(&TrackerEvent::TierChanged {
                from: before,
                to: after,
            });
        }
    }

    fn persist(&self) {
        match serde_json::to_string(&self.budget) {
            Ok(raw) => persist::write_best_effort(
                self.store.as_ref(),
                self.events.as_ref(),
                BUDGET_KEY,
                &raw,
            ),
            Err(e) => log::error!("Failed to serialize budget: {e}"),
        }
    }
}
