use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Daily limit used when nothing has been persisted yet (2 hours)
pub const DEFAULT_DAILY_LIMIT_MINUTES: u32 = 120;

/// Daily limit presets offered to the user, in minutes
pub const DAILY_LIMIT_PRESETS: [u32; 5] = [60, 90, 120, 180, 240];

/// Break lengths offered to the user, in minutes
pub const BREAK_PRESETS_MINUTES: [u32; 3] = [5, 10, 15];

/// Day-scoped usage budget.
///
/// Serialized under the `timeControl` key. Field aliases accept the shape the
/// mobile client wrote before the reset date stamp existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBudget {
    #[serde(alias = "dailyLimit")]
    pub daily_limit_minutes: u32,
    #[serde(alias = "currentUsage", default)]
    pub current_usage_minutes: u32,
    #[serde(default)]
    pub break_remaining_seconds: u32,
    /// Local time the active break runs out, so a later run can catch up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_ends_at: Option<NaiveDateTime>,
    /// Local date of the most recent reset; `None` for records written before it was tracked
    #[serde(default)]
    pub last_reset_date: Option<NaiveDate>,
}

impl UsageBudget {
    #[must_use]
    pub const fn new(daily_limit_minutes: u32, today: NaiveDate) -> Self {
        Self {
            daily_limit_minutes,
            current_usage_minutes: 0,
            break_remaining_seconds: 0,
            break_ends_at: None,
            last_reset_date: Some(today),
        }
    }

    /// `current / limit`; may exceed 1.0 once usage overshoots the limit
    #[must_use]
    pub fn usage_ratio(&self) -> f64 {
        if self.daily_limit_minutes == 0 {
            return 0.0;
        }
        f64::from(self.current_usage_minutes) / f64::from(self.daily_limit_minutes)
    }

    #[must_use]
    pub const fn is_on_break(&self) -> bool {
        self.break_remaining_seconds > 0
    }
}

/// Usage tier used to pick a suggestion and to colour the usage bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageTier {
    Normal,
    Elevated,
    Warning,
    Critical,
}

impl UsageTier {
    pub const ELEVATED_THRESHOLD: f64 = 0.50;
    pub const WARNING_THRESHOLD: f64 = 0.75;
    pub const CRITICAL_THRESHOLD: f64 = 0.90;

    /// Classify a usage ratio; thresholds are inclusive lower bounds
    #[must_use]
    pub fn classify(ratio: f64) -> Self {
        if ratio >= Self::CRITICAL_THRESHOLD {
            Self::Critical
        } else if ratio >= Self::WARNING_THRESHOLD {
            Self::Warning
        } else if ratio >= Self::ELEVATED_THRESHOLD {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// User-facing suggestion for this tier
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Normal => "You're doing great! Keep creating and exploring",
            Self::Elevated => "Try a different mood to refresh your feed",
            Self::Warning => "Switch to Spark mode for shorter content",
            Self::Critical => "Consider taking a break and continuing tomorrow",
        }
    }
}

/// Classify a usage ratio into a tier
#[must_use]
pub fn classify_usage(ratio: f64) -> UsageTier {
    UsageTier::classify(ratio)
}
