//! Session Controller - owns the tracker, mood and energy score for one run.
//!
//! `init` loads persisted state, applies any pending day rollover and arms the
//! timers; `dispose` stops them. Between the two, all tracker access goes
//! through the shared lock the timers also use.

use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use moodreel_storage::KeyValueStore;

use crate::clock::Clock;
use crate::content::{ContentItem, Mood, MAX_ENERGY_SCORE};
use crate::creator::CreatorRank;
use crate::error::CoreError;
use crate::events::EventSink;
use crate::persist;
use crate::ranker::FeedRanker;
use crate::timers::{BreakTicker, MidnightScheduler, SharedTracker};
use crate::tracker::{TrackerOptions, UsageSnapshot, UsageTracker};

/// Store key for the selected mood
pub const MOOD_KEY: &str = "currentMood";
/// Store key for the local energy score
pub const ENERGY_KEY: &str = "energyScore";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionOptions {
    pub tracker: TrackerOptions,
    pub ranker: FeedRanker,
}

pub struct SessionController {
    id: Uuid,
    tracker: SharedTracker,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    ranker: FeedRanker,
    mood: Mood,
    energy_score: u8,
    break_ticker: BreakTicker,
    midnight: MidnightScheduler,
    active: bool,
}

impl SessionController {
    /// Load persisted state and start the session's timers.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn init(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
        options: SessionOptions,
    ) -> Self {
        let id = Uuid::new_v4();
        let mut tracker = UsageTracker::load(
            store.clone(),
            clock.clone(),
            events.clone(),
            options.tracker,
        );
        if tracker.reset_if_new_day() {
            log::info!("Applied pending daily reset on startup");
        }
        if tracker.catch_up_break() {
            log::info!("Break from a previous run ended while away");
        }

        let mood = load_mood(store.as_ref());
        let energy_score = load_energy_score(store.as_ref());

        let mut session = Self {
            id,
            tracker: Arc::new(Mutex::new(tracker)),
            store,
            clock,
            events,
            ranker: options.ranker,
            mood,
            energy_score,
            break_ticker: BreakTicker::new(),
            midnight: MidnightScheduler::new(),
            active: true,
        };

        session.arm_midnight();
        if session.tracker.lock().await.is_on_break() {
            log::info!("Resuming break countdown from previous run");
            session.break_ticker.start(session.tracker.clone());
        }

        log::info!(
            "Session {} started (mood: {}, energy: {})",
            session.id,
            session.mood,
            session.energy_score
        );
        session
    }

    /// Handle the process coming back to the foreground.
    ///
    /// Applies a missed day rollover and re-arms the midnight timer with a
    /// fresh delay. A pending break is caught up with the clock and its
    /// countdown restarted if it has time left. Returns
    /// whether usage was reset.
    pub async fn on_resume(&mut self) -> bool {
        if !self.active {
            log::warn!("on_resume called on disposed session {}", self.id);
            return false;
        }
        let (reset, on_break) = {
            let mut tracker = self.tracker.lock().await;
            let reset = tracker.reset_if_new_day();
            tracker.catch_up_break();
            (reset, tracker.is_on_break())
        };
        self.arm_midnight();
        if on_break && !self.break_ticker.is_running() {
            self.break_ticker.start(self.tracker.clone());
        } else if !on_break {
            self.break_ticker.cancel();
        }
        reset
    }

    /// Stop all timers. Safe to call more than once.
    pub fn dispose(&mut self) {
        if !self.active {
            return;
        }
        self.break_ticker.cancel();
        self.midnight.cancel();
        self.active = false;
        log::info!("Session {} disposed", self.id);
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Handle to the tracker shared with the timers
    #[must_use]
    pub fn tracker(&self) -> SharedTracker {
        self.tracker.clone()
    }

    #[must_use]
    pub const fn ranker(&self) -> &FeedRanker {
        &self.ranker
    }

    #[must_use]
    pub const fn mood(&self) -> Mood {
        self.mood
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
        persist::write_best_effort(
            self.store.as_ref(),
            self.events.as_ref(),
            MOOD_KEY,
            mood.as_str(),
        );
    }

    #[must_use]
    pub const fn energy_score(&self) -> u8 {
        self.energy_score
    }

    /// Add `points` to the energy score, capped at 100. Returns the new score.
    pub fn increment_energy_score(&mut self, points: u8) -> u8 {
        self.energy_score = self.energy_score.saturating_add(points).min(MAX_ENERGY_SCORE);
        persist::write_best_effort(
            self.store.as_ref(),
            self.events.as_ref(),
            ENERGY_KEY,
            &self.energy_score.to_string(),
        );
        self.energy_score
    }

    #[must_use]
    pub const fn creator_rank(&self) -> CreatorRank {
        CreatorRank::from_energy(self.energy_score)
    }

    /// Rank `items` for the current mood at the current usage ratio
    pub async fn rank_feed(&self, items: &[ContentItem]) -> Vec<ContentItem> {
        let ratio = self.tracker.lock().await.compute_usage_ratio();
        self.ranker.rank(items, self.mood, ratio)
    }

    pub async fn snapshot(&self) -> UsageSnapshot {
        self.tracker.lock().await.snapshot()
    }

    /// Start a break and its countdown, replacing any active break.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `duration_minutes` is zero
    pub async fn start_break(&mut self, duration_minutes: u32) -> Result<(), CoreError> {
        self.tracker.lock().await.start_break(duration_minutes)?;
        self.break_ticker.start(self.tracker.clone());
        Ok(())
    }

    pub async fn cancel_break(&mut self) {
        self.break_ticker.cancel();
        self.tracker.lock().await.cancel_break();
    }

    #[must_use]
    pub fn is_break_ticking(&self) -> bool {
        self.break_ticker.is_running()
    }

    pub async fn record_usage(&self, minutes: u32) {
        self.tracker.lock().await.record_usage(minutes);
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` if `minutes` is zero
    pub async fn set_daily_limit(&self, minutes: u32) -> Result<(), CoreError> {
        self.tracker.lock().await.set_daily_limit(minutes)
    }

    pub async fn reset_daily_usage(&self) {
        self.tracker.lock().await.reset_daily_usage();
    }

    fn arm_midnight(&mut self) {
        let delay = self.midnight.arm(self.tracker.clone(), self.clock.clone());
        log::debug!("Next daily reset in {} s", delay / 1000);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn load_mood(store: &dyn KeyValueStore) -> Mood {
    match store.get(MOOD_KEY) {
        Ok(Some(raw)) => raw.trim().trim_matches('"').parse().unwrap_or_else(|e| {
            log::warn!("Ignoring stored mood: {e}");
            Mood::default()
        }),
        Ok(None) => Mood::default(),
        Err(e) => {
            log::error!("Failed to load mood: {e}");
            Mood::default()
        }
    }
}

fn load_energy_score(store: &dyn KeyValueStore) -> u8 {
    match store.get(ENERGY_KEY) {
        Ok(Some(raw)) => raw
            .trim()
            .parse::<u32>()
            .map(|score| u8::try_from(score).unwrap_or(u8::MAX).min(MAX_ENERGY_SCORE))
            .unwrap_or_else(|e| {
                log::warn!("Ignoring stored energy score '{raw}': {e}");
                0
            }),
        Ok(None) => 0,
        Err(e) => {
            log::error!("Failed to load energy score: {e}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::content::Mode;
    use crate::events::{RecordingSink, TrackerEvent};
    use crate::tracker::BUDGET_KEY;
    use chrono::{NaiveDate, NaiveDateTime};
    use moodreel_storage::MemoryStore;
    use std::time::Duration;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        events: Arc<RecordingSink>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                clock: Arc::new(ManualClock::new(at(10, 9, 0))),
                events: Arc::new(RecordingSink::new()),
            }
        }

        async fn session(&self) -> SessionController {
            SessionController::init(
                self.store.clone(),
                self.clock.clone(),
                self.events.clone(),
                SessionOptions::default(),
            )
            .await
        }
    }

    fn item(id: &str, mood: Mood, mode: Mode, energy: u8, engagement: u64) -> ContentItem {
        ContentItem::new(id, mood, mode, energy, engagement).unwrap()
    }

    // ==================== Lifecycle ====================

    #[tokio::test(start_paused = true)]
    async fn test_init_applies_missed_rollover() {
        let fx = Fixture::new();
        {
            let mut session = fx.session().await;
            session.record_usage(45).await;
            session.dispose();
        }

        fx.clock.set(at(12, 7, 30));
        let session = fx.session().await;

        assert_eq!(session.snapshot().await.budget.current_usage_minutes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_resume_resets_after_suspension() {
        let fx = Fixture::new();
        let mut session = fx.session().await;
        session.record_usage(30).await;

        assert!(!session.on_resume().await);

        fx.clock.set(at(11, 6, 0));
        assert!(session.on_resume().await);
        assert_eq!(session.snapshot().await.budget.current_usage_minutes, 0);

        // Second resume on the same day does nothing
        session.record_usage(3).await;
        assert!(!session.on_resume().await);
        assert_eq!(session.snapshot().await.budget.current_usage_minutes, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_break_countdown() {
        let fx = Fixture::new();
        let mut session = fx.session().await;
        session.start_break(5).await.unwrap();
        assert!(session.is_break_ticking());

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        session.dispose();
        session.dispose();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(!session.is_active());
        assert!(!session.is_break_ticking());
        assert_eq!(session.snapshot().await.budget.break_remaining_seconds, 297);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_resumes_pending_break() {
        let fx = Fixture::new();
        {
            let mut session = fx.session().await;
            session.start_break(10).await.unwrap();
            session.dispose();
        }

        let session = fx.session().await;
        assert!(session.is_break_ticking());
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(session.snapshot().await.budget.break_remaining_seconds, 598);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_left_by_previous_run_expires_with_the_clock() {
        let fx = Fixture::new();
        {
            let mut session = fx.session().await;
            session.start_break(10).await.unwrap();
            session.dispose();
        }

        fx.clock.advance(chrono::Duration::minutes(4));
        let mut session = fx.session().await;
        assert_eq!(session.snapshot().await.budget.break_remaining_seconds, 360);
        session.dispose();

        fx.clock.advance(chrono::Duration::hours(1));
        let session = fx.session().await;
        let snapshot = session.snapshot().await;
        assert!(!snapshot.on_break);
        assert_eq!(snapshot.budget.break_remaining_seconds, 0);
        assert!(!session.is_break_ticking());
        assert!(fx
            .events
            .events()
            .iter()
            .any(|e| matches!(e, TrackerEvent::BreakFinished)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_resume_finishes_break_that_ran_out_while_suspended() {
        let fx = Fixture::new();
        let mut session = fx.session().await;
        session.start_break(5).await.unwrap();

        fx.clock.advance(chrono::Duration::minutes(20));
        session.on_resume().await;

        assert!(!session.snapshot().await.on_break);
        assert!(!session.is_break_ticking());
    }

    // ==================== Breaks ====================

    #[tokio::test(start_paused = true)]
    async fn test_start_break_zero_keeps_ticker_idle() {
        let fx = Fixture::new();
        let mut session = fx.session().await;

        let err = session.start_break(0).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!session.is_break_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_break() {
        let fx = Fixture::new();
        let mut session = fx.session().await;
        session.start_break(5).await.unwrap();
        session.cancel_break().await;

        assert!(!session.is_break_ticking());
        assert!(!session.snapshot().await.on_break);
        assert!(fx
            .events
            .events()
            .iter()
            .any(|e| matches!(e, TrackerEvent::BreakCancelled { .. })));
    }

    // ==================== Mood and energy ====================

    #[tokio::test(start_paused = true)]
    async fn test_mood_is_persisted() {
        let fx = Fixture::new();
        {
            let mut session = fx.session().await;
            assert_eq!(session.mood(), Mood::Focus);
            session.set_mood(Mood::Chill);
        }

        assert_eq!(fx.store.get(MOOD_KEY).unwrap().as_deref(), Some("chill"));
        assert_eq!(fx.session().await.mood(), Mood::Chill);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_stored_mood_falls_back_to_focus() {
        let fx = Fixture::new();
        fx.store.set(MOOD_KEY, "sleepy").unwrap();

        assert_eq!(fx.session().await.mood(), Mood::Focus);
    }

    #[tokio::test(start_paused = true)]
    async fn test_energy_score_is_capped_and_persisted() {
        let fx = Fixture::new();
        let mut session = fx.session().await;

        assert_eq!(session.increment_energy_score(40), 40);
        assert_eq!(session.creator_rank(), CreatorRank::Pro);
        assert_eq!(session.increment_energy_score(250), 100);
        assert_eq!(session.creator_rank(), CreatorRank::Legend);
        assert_eq!(fx.store.get(ENERGY_KEY).unwrap().as_deref(), Some("100"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_energy_above_cap_is_clamped() {
        let fx = Fixture::new();
        fx.store.set(ENERGY_KEY, "450").unwrap();

        assert_eq!(fx.session().await.energy_score(), 100);
    }

    // ==================== Feed ====================

    #[tokio::test(start_paused = true)]
    async fn test_rank_feed_follows_usage_ratio() {
        let fx = Fixture::new();
        let session = fx.session().await;
        let items = vec![
            item("A", Mood::Focus, Mode::Deep, 85, 892),
            item("B", Mood::Focus, Mode::Spark, 92, 8900),
            item("C", Mood::Fun, Mode::Spark, 99, 100),
        ];

        session.set_daily_limit(100).await.unwrap();
        session.record_usage(20).await;
        let ids: Vec<String> = session
            .rank_feed(&items)
            .await
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(ids, vec!["B", "A"]);

        session.record_usage(60).await;
        let ids: Vec<String> = session
            .rank_feed(&items)
            .await
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_reach_the_store() {
        let fx = Fixture::new();
        let session = fx.session().await;
        session.set_daily_limit(90).await.unwrap();
        session.record_usage(15).await;

        let raw = fx.store.get(BUDGET_KEY).unwrap().unwrap();
        assert!(raw.contains("\"dailyLimitMinutes\":90"));
        assert!(raw.contains("\"currentUsageMinutes\":15"));
    }
}
