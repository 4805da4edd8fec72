//! Content Ranker - mood/time-aware feed ordering.
//!
//! Ranking is a pure function of the catalog, the selected mood and the usage
//! ratio:
//! 1. keep items matching the mood
//! 2. drop long-form items once the usage ratio reaches the deep-content cutoff
//! 3. order by `energy_score + engagement_count / divisor`, highest first
//!
//! The sort is stable, so items with equal scores keep their catalog order.

use crate::content::{ContentItem, Mode, Mood};

#[cfg(test)]
mod tests;

/// Usage ratio from which long-form content is suppressed.
///
/// Separate from the 0.75 warning tier: one drives UI warnings, this one the content mix.
pub const DEEP_CONTENT_CUTOFF: f64 = 0.70;

/// Engagement is down-weighted by this factor against the 0-100 energy scale
pub const ENGAGEMENT_DIVISOR: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedRanker {
    pub deep_content_cutoff: f64,
    pub engagement_divisor: f64,
}

impl Default for FeedRanker {
    fn default() -> Self {
        Self {
            deep_content_cutoff: DEEP_CONTENT_CUTOFF,
            engagement_divisor: ENGAGEMENT_DIVISOR,
        }
    }
}

impl FeedRanker {
    /// Composite score of a single item
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, item: &ContentItem) -> f64 {
        f64::from(item.energy_score()) + item.engagement_count() as f64 / self.engagement_divisor
    }

    /// Whether long-form content is still offered at this usage ratio
    #[must_use]
    pub fn allows_deep_content(&self, usage_ratio: f64) -> bool {
        usage_ratio < self.deep_content_cutoff
    }

    /// Filter and order `items` for `mood` at `usage_ratio`.
    ///
    /// Returns clones; `items` is left untouched. An empty catalog or no
    /// mood match yields an empty feed.
    #[must_use]
    pub fn rank(&self, items: &[ContentItem], mood: Mood, usage_ratio: f64) -> Vec<ContentItem> {
        let allow_deep = self.allows_deep_content(usage_ratio);

        let mut scored: Vec<(f64, &ContentItem)> = items
            .iter()
            .filter(|item| item.mood() == mood)
            .filter(|item| allow_deep || item.mode() != Mode::Deep)
            .map(|item| (self.score(item), item))
            .collect();

        // sort_by is stable: equal scores keep catalog order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        log::debug!(
            "Ranked {} of {} items for mood '{mood}' at usage {usage_ratio:.2} (deep allowed: {allow_deep})",
            scored.len(),
            items.len()
        );

        scored.into_iter().map(|(_, item)| item.clone()).collect()
    }
}

/// Rank a catalog with the default cutoff and engagement weighting
#[must_use]
pub fn rank_feed(items: &[ContentItem], mood: Mood, usage_ratio: f64) -> Vec<ContentItem> {
    FeedRanker::default().rank(items, mood, usage_ratio)
}
