//! Observability hook for the usage tracker.
//!
//! Mutators report what happened through an [`EventSink`] instead of returning
//! side-channel values, so logging and metrics stay out of the control flow.

use serde::Serialize;
use std::sync::Mutex;

use crate::budget::UsageTier;

/// Why usage went back to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    /// A local midnight passed since the last reset
    DayRollover,
    /// The user asked for it
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    UsageRecorded { minutes: u32, total_minutes: u32 },
    TierChanged { from: UsageTier, to: UsageTier },
    UsageReset { reason: ResetReason, previous_minutes: u32 },
    DailyLimitChanged { minutes: u32 },
    BreakStarted { seconds: u32 },
    BreakFinished,
    BreakCancelled { remaining_seconds: u32 },
    PersistenceFailed { key: String, reason: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TrackerEvent);
}

/// Default sink: writes every event through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &TrackerEvent) {
        match event {
            TrackerEvent::PersistenceFailed { key, reason } => {
                log::warn!("Failed to persist '{key}': {reason}");
            }
            TrackerEvent::TierChanged { from, to } => {
                log::info!("Usage tier changed: {} -> {}", from.label(), to.label());
            }
            TrackerEvent::UsageRecorded { .. } => log::debug!("{event:?}"),
            _ => log::info!("{event:?}"),
        }
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TrackerEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<TrackerEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &TrackerEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event.clone());
    }
}
