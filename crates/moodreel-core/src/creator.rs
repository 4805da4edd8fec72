//! Creator rank and achievement rules.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Creator tier derived from an energy level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorRank {
    Rising,
    Pro,
    Legend,
}

impl CreatorRank {
    /// Rank for an energy level; values above 100 count as Legend
    #[must_use]
    pub const fn from_energy(energy: u8) -> Self {
        match energy {
            0..=33 => Self::Rising,
            34..=66 => Self::Pro,
            _ => Self::Legend,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rising => "Rising",
            Self::Pro => "Pro",
            Self::Legend => "Legend",
        }
    }

    #[must_use]
    pub const fn energy_range(&self) -> RangeInclusive<u8> {
        match self {
            Self::Rising => 0..=33,
            Self::Pro => 34..=66,
            Self::Legend => 67..=100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Public creator counters used to evaluate achievements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatorStats {
    pub videos: u32,
    /// Views of the creator's most watched video
    pub top_video_views: u64,
    pub followers: u64,
    pub energy_level: u8,
}

impl CreatorStats {
    #[must_use]
    pub const fn rank(&self) -> CreatorRank {
        CreatorRank::from_energy(self.energy_level)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    #[serde(skip)]
    unlocked_by: fn(&CreatorStats) -> bool,
}

impl Achievement {
    #[must_use]
    pub fn is_unlocked(&self, stats: &CreatorStats) -> bool {
        (self.unlocked_by)(stats)
    }
}

pub const ACHIEVEMENTS: [Achievement; 5] = [
    Achievement {
        id: "first_video",
        name: "First Spark",
        description: "Upload your first video",
        rarity: Rarity::Common,
        unlocked_by: |s| s.videos >= 1,
    },
    Achievement {
        id: "hundred_views",
        name: "Rising Star",
        description: "Get 100 views on a video",
        rarity: Rarity::Common,
        unlocked_by: |s| s.top_video_views >= 100,
    },
    Achievement {
        id: "thousand_followers",
        name: "Influencer",
        description: "Reach 1000 followers",
        rarity: Rarity::Rare,
        unlocked_by: |s| s.followers >= 1000,
    },
    Achievement {
        id: "ten_thousand_views",
        name: "Viral Creator",
        description: "Get 10,000 views on a video",
        rarity: Rarity::Epic,
        unlocked_by: |s| s.top_video_views >= 10_000,
    },
    Achievement {
        id: "legend_rank",
        name: "Legend",
        description: "Achieve Legend creator rank",
        rarity: Rarity::Legendary,
        unlocked_by: |s| s.rank() == CreatorRank::Legend,
    },
];

/// Achievements unlocked by `stats`, in catalog order
#[must_use]
pub fn unlocked_achievements(stats: &CreatorStats) -> Vec<&'static Achievement> {
    ACHIEVEMENTS.iter().filter(|a| a.is_unlocked(stats)).collect()
}

/// Percentage of the catalog unlocked, 0-100
#[must_use]
pub fn achievement_progress(stats: &CreatorStats) -> u8 {
    let unlocked = unlocked_achievements(stats).len();
    // At most 5 of 5
    #[allow(clippy::cast_possible_truncation)]
    let percent = (unlocked * 100 / ACHIEVEMENTS.len()) as u8;
    percent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(CreatorRank::from_energy(0), CreatorRank::Rising);
        assert_eq!(CreatorRank::from_energy(33), CreatorRank::Rising);
        assert_eq!(CreatorRank::from_energy(34), CreatorRank::Pro);
        assert_eq!(CreatorRank::from_energy(66), CreatorRank::Pro);
        assert_eq!(CreatorRank::from_energy(67), CreatorRank::Legend);
        assert_eq!(CreatorRank::from_energy(100), CreatorRank::Legend);
    }

    #[test]
    fn test_rank_ranges_cover_energy_scale() {
        for energy in 0..=100u8 {
            assert!(CreatorRank::from_energy(energy).energy_range().contains(&energy));
        }
    }

    #[test]
    fn test_new_creator_has_nothing_unlocked() {
        let stats = CreatorStats::default();
        assert!(unlocked_achievements(&stats).is_empty());
        assert_eq!(achievement_progress(&stats), 0);
    }

    #[test]
    fn test_unlocked_achievements() {
        let stats = CreatorStats {
            videos: 3,
            top_video_views: 12_000,
            followers: 800,
            energy_level: 70,
        };

        let ids: Vec<&str> = unlocked_achievements(&stats).iter().map(|a| a.id).collect();
        assert_eq!(
            ids,
            vec!["first_video", "hundred_views", "ten_thousand_views", "legend_rank"]
        );
        assert_eq!(achievement_progress(&stats), 80);
    }

    #[test]
    fn test_stats_deserialize_with_missing_fields() {
        let stats: CreatorStats = serde_json::from_str(r#"{"followers": 1500}"#).unwrap();
        assert_eq!(stats.followers, 1500);
        assert_eq!(stats.videos, 0);
        assert_eq!(unlocked_achievements(&stats)[0].rarity, Rarity::Rare);
    }
}
