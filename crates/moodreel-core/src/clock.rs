//! Local wall-clock access.
//!
//! The daily reset follows the device's local calendar, so the clock hands out
//! naive local date-times rather than UTC instants.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Current local wall-clock time
    fn now_local(&self) -> NaiveDateTime;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }

    /// Milliseconds until the next local midnight
    fn millis_until_next_midnight(&self) -> u64 {
        millis_until_next_midnight(self.now_local())
    }
}

/// Clock backed by the operating system's local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn millis_until_next_midnight(&self) -> u64 {
        millis_until_next_zoned_midnight(&Local::now())
    }
}

/// Settable clock for simulations and tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now_local(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Milliseconds from `now` until the next local midnight
#[must_use]
pub fn millis_until_next_midnight(now: NaiveDateTime) -> u64 {
    let Some(next_midnight) = now.date().succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return 0;
    };
    u64::try_from((next_midnight - now).num_milliseconds()).unwrap_or(0)
}

/// Milliseconds from `now` until the next midnight of its timezone.
///
/// Measured in real elapsed time, so a day that gains or loses an hour to a
/// DST change is not off by that hour. Where midnight itself is skipped the
/// first valid instant after it is used.
#[must_use]
pub fn millis_until_next_zoned_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> u64 {
    let Some(next_midnight) = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return 0;
    };
    let zone = now.timezone();
    let target = (0..=2).find_map(|hours| {
        match zone.from_local_datetime(&(next_midnight + Duration::hours(hours))) {
            LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Some(at),
            LocalResult::None => None,
        }
    });
    target.map_or(0, |at| {
        u64::try_from(at.signed_duration_since(now.clone()).num_milliseconds()).unwrap_or(0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_millis_until_next_midnight() {
        assert_eq!(millis_until_next_midnight(at(23, 59, 0)), 60_000);
        assert_eq!(millis_until_next_midnight(at(0, 0, 0)), 86_400_000);
        assert_eq!(millis_until_next_midnight(at(12, 0, 0)), 43_200_000);
    }

    #[test]
    fn test_zoned_midnight_uses_the_offset_of_the_zone() {
        let zone = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let now = zone.from_local_datetime(&at(23, 0, 0)).unwrap();
        assert_eq!(millis_until_next_zoned_midnight(&now), 3_600_000);

        let now = chrono::Utc.from_utc_datetime(&at(18, 30, 0));
        assert_eq!(millis_until_next_zoned_midnight(&now), 19_800_000);
    }

    #[test]
    fn test_system_clock_delay_is_within_a_day() {
        let delay = SystemClock.millis_until_next_midnight();
        assert!(delay > 0);
        // 25 h covers a fall-back day
        assert!(delay <= 25 * 3_600_000);
    }

    #[test]
    fn test_manual_clock_advance_crosses_midnight() {
        let clock = ManualClock::new(at(23, 30, 0));
        clock.advance(Duration::minutes(45));

        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }
}
