//! Content catalog model: moods, length modes and rankable items.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::CoreError;

/// Highest valid creator energy score
pub const MAX_ENERGY_SCORE: u8 = 100;

/// User-selected content category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Focus,
    Fun,
    Learn,
    Chill,
}

impl Mood {
    pub const ALL: [Self; 4] = [Self::Focus, Self::Fun, Self::Learn, Self::Chill];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Fun => "fun",
            Self::Learn => "learn",
            Self::Chill => "chill",
        }
    }

    /// Display name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Fun => "Fun",
            Self::Learn => "Learn",
            Self::Chill => "Chill",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Focus => "Deep work and concentration",
            Self::Fun => "Entertainment and enjoyment",
            Self::Learn => "Educational content",
            Self::Chill => "Relax and unwind",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "mood",
                value: s.to_string(),
            })
    }
}

/// Content length class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Short-form
    Spark,
    /// Long-form
    Deep,
}

impl Mode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spark => "spark",
            Self::Deep => "deep",
        }
    }

    /// Allowed media duration for this mode, in seconds
    #[must_use]
    pub const fn duration_bounds_secs(&self) -> RangeInclusive<u32> {
        match self {
            Self::Spark => 30..=60,
            Self::Deep => 300..=1200,
        }
    }

    /// Check whether a clip of `duration_secs` belongs in this mode
    #[must_use]
    pub fn accepts_duration(&self, duration_secs: u32) -> bool {
        self.duration_bounds_secs().contains(&duration_secs)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spark" => Ok(Self::Spark),
            "deep" => Ok(Self::Deep),
            _ => Err(CoreError::UnknownVariant {
                kind: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// A candidate piece of content to rank.
///
/// `mood` and `mode` are fixed at construction; the two quality signals can be
/// refreshed between ranking passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ContentRecord")]
pub struct ContentItem {
    id: String,
    mood: Mood,
    mode: Mode,
    energy_score: u8,
    engagement_count: u64,
}

impl ContentItem {
    /// Create a content item
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `energy_score` is above 100
    pub fn new(
        id: impl Into<String>,
        mood: Mood,
        mode: Mode,
        energy_score: u8,
        engagement_count: u64,
    ) -> Result<Self, CoreError> {
        validate_energy(energy_score)?;
        Ok(Self {
            id: id.into(),
            mood,
            mode,
            energy_score,
            engagement_count,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn mood(&self) -> Mood {
        self.mood
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn energy_score(&self) -> u8 {
        self.energy_score
    }

    #[must_use]
    pub const fn engagement_count(&self) -> u64 {
        self.engagement_count
    }

    /// Replace the upstream quality signals
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `energy_score` is above 100; the item is left unchanged
    pub fn refresh_signals(
        &mut self,
        energy_score: u8,
        engagement_count: u64,
    ) -> Result<(), CoreError> {
        validate_energy(energy_score)?;
        self.energy_score = energy_score;
        self.engagement_count = engagement_count;
        Ok(())
    }
}

fn validate_energy(energy_score: u8) -> Result<(), CoreError> {
    if energy_score > MAX_ENERGY_SCORE {
        return Err(CoreError::invalid("energy_score", "between 0 and 100", energy_score));
    }
    Ok(())
}

/// Engagement as it appears in catalog exports: a plain count or a compact label like "8.9K"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Engagement {
    Count(u64),
    Label(String),
}

/// Wire shape of a catalog entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentRecord {
    id: String,
    mood: Mood,
    mode: Mode,
    energy_score: u8,
    #[serde(alias = "likes", alias = "likeCount")]
    engagement_count: Engagement,
}

impl TryFrom<ContentRecord> for ContentItem {
    type Error = CoreError;

    fn try_from(record: ContentRecord) -> Result<Self, Self::Error> {
        let engagement = match record.engagement_count {
            Engagement::Count(count) => count,
            Engagement::Label(label) => parse_engagement_count(&label)?,
        };
        Self::new(record.id, record.mood, record.mode, record.energy_score, engagement)
    }
}

/// Parse a compact engagement label ("892", "1,204", "8.9K", "1.2M") into a count
///
/// # Errors
///
/// Returns `InvalidArgument` if the label is empty, negative or not a number
pub fn parse_engagement_count(label: &str) -> Result<u64, CoreError> {
    let cleaned: String = label.trim().chars().filter(|c| *c != ',').collect();
    let invalid = || CoreError::invalid("engagement_count", "a count like 892 or 8.9K", label);

    let (number, multiplier) = match cleaned.chars().last() {
        Some('k' | 'K') => (&cleaned[..cleaned.len() - 1], 1_000_f64),
        Some('m' | 'M') => (&cleaned[..cleaned.len() - 1], 1_000_000_f64),
        Some('b' | 'B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000_f64),
        Some(_) => return cleaned.parse::<u64>().map_err(|_| invalid()),
        None => return Err(invalid()),
    };

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    let scaled = (value * multiplier).round();
    if scaled > u64::MAX as f64 {
        return Err(invalid());
    }

    // Range checked above
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = scaled as u64;
    Ok(count)
}
