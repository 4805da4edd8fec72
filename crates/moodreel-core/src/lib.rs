pub mod budget;
pub mod clock;
pub mod config;
pub mod content;
pub mod creator;
pub mod error;
pub mod events;
pub mod format;
mod persist;
pub mod ranker;
pub mod session;
pub mod timers;
pub mod tracker;

pub use budget::{classify_usage, UsageBudget, UsageTier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use content::{parse_engagement_count, ContentItem, Mode, Mood};
pub use creator::{Achievement, CreatorRank, CreatorStats, Rarity};
pub use error::CoreError;
pub use events::{EventSink, LogSink, RecordingSink, ResetReason, TrackerEvent};
pub use ranker::{rank_feed, FeedRanker};
pub use session::{SessionController, SessionOptions};
pub use timers::{BreakTicker, MidnightScheduler, SharedTracker};
pub use tracker::{TrackerOptions, UsageSnapshot, UsageTracker};
