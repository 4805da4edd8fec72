use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::budget::{BREAK_PRESETS_MINUTES, DAILY_LIMIT_PRESETS, DEFAULT_DAILY_LIMIT_MINUTES};
use crate::ranker::{FeedRanker, DEEP_CONTENT_CUTOFF, ENGAGEMENT_DIVISOR};
use crate::session::SessionOptions;
use crate::tracker::TrackerOptions;

/// Get the local data directory for moodreel.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("moodreel");
    Ok(path)
}

/// Default location of `config.toml`
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub default_daily_limit_minutes: u32,
    pub daily_limit_presets: Vec<u32>,
    pub break_presets_minutes: Vec<u32>,
    /// Fraction of the limit above which the time warning banner shows
    pub time_warning_ratio: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_daily_limit_minutes: DEFAULT_DAILY_LIMIT_MINUTES,
            daily_limit_presets: DAILY_LIMIT_PRESETS.to_vec(),
            break_presets_minutes: BREAK_PRESETS_MINUTES.to_vec(),
            time_warning_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub deep_content_cutoff: f64,
    pub engagement_divisor: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            deep_content_cutoff: DEEP_CONTENT_CUTOFF,
            engagement_divisor: ENGAGEMENT_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; defaults to `<data dir>/moodreel.db`
    pub database_path: Option<PathBuf>,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub limits: LimitsConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from `path`, or defaults if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or holds out-of-range values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Reject values the tracker or ranker cannot work with
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid key
    pub fn validate(&self) -> Result<()> {
        if self.limits.default_daily_limit_minutes == 0 {
            anyhow::bail!("limits.default_daily_limit_minutes must be positive");
        }
        if self.limits.daily_limit_presets.contains(&0) {
            anyhow::bail!("limits.daily_limit_presets must all be positive");
        }
        if self.limits.break_presets_minutes.contains(&0) {
            anyhow::bail!("limits.break_presets_minutes must all be positive");
        }
        if !(self.limits.time_warning_ratio.is_finite() && self.limits.time_warning_ratio > 0.0) {
            anyhow::bail!("limits.time_warning_ratio must be a positive number");
        }
        if !(self.feed.deep_content_cutoff.is_finite() && self.feed.deep_content_cutoff >= 0.0) {
            anyhow::bail!("feed.deep_content_cutoff must be a non-negative number");
        }
        if !(self.feed.engagement_divisor.is_finite() && self.feed.engagement_divisor > 0.0) {
            anyhow::bail!("feed.engagement_divisor must be a positive number");
        }
        Ok(())
    }

    /// Look up a `<section>.<key>` value as a string
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed or unknown key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "limits.default_daily_limit_minutes" => {
                self.limits.default_daily_limit_minutes.to_string()
            }
            "limits.daily_limit_presets" => join(&self.limits.daily_limit_presets),
            "limits.break_presets_minutes" => join(&self.limits.break_presets_minutes),
            "limits.time_warning_ratio" => self.limits.time_warning_ratio.to_string(),
            "feed.deep_content_cutoff" => self.feed.deep_content_cutoff.to_string(),
            "feed.engagement_divisor" => self.feed.engagement_divisor.to_string(),
            "storage.database_path" => self
                .storage
                .database_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => anyhow::bail!("Unknown config key: {key}. Run `moodreel config list` for valid keys"),
        };
        Ok(value)
    }

    /// Set a `<section>.<key>` value from its string form
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key, an unparsable value, or a value that fails validation
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "limits.default_daily_limit_minutes" => {
                updated.limits.default_daily_limit_minutes = parse(key, value)?;
            }
            "limits.daily_limit_presets" => {
                updated.limits.daily_limit_presets = parse_list(key, value)?;
            }
            "limits.break_presets_minutes" => {
                updated.limits.break_presets_minutes = parse_list(key, value)?;
            }
            "limits.time_warning_ratio" => updated.limits.time_warning_ratio = parse(key, value)?,
            "feed.deep_content_cutoff" => updated.feed.deep_content_cutoff = parse(key, value)?,
            "feed.engagement_divisor" => updated.feed.engagement_divisor = parse(key, value)?,
            "storage.database_path" => {
                updated.storage.database_path =
                    (!value.trim().is_empty()).then(|| PathBuf::from(value.trim()));
            }
            _ => anyhow::bail!("Unknown config key: {key}. Run `moodreel config list` for valid keys"),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every key with its current value, in display order
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }

    pub const KEYS: [&'static str; 7] = [
        "limits.default_daily_limit_minutes",
        "limits.daily_limit_presets",
        "limits.break_presets_minutes",
        "limits.time_warning_ratio",
        "feed.deep_content_cutoff",
        "feed.engagement_divisor",
        "storage.database_path",
    ];

    /// Tracker and ranker settings for a session
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            tracker: TrackerOptions {
                default_daily_limit_minutes: self.limits.default_daily_limit_minutes,
                time_warning_ratio: self.limits.time_warning_ratio,
            },
            ranker: FeedRanker {
                deep_content_cutoff: self.feed.deep_content_cutoff,
                engagement_divisor: self.feed.engagement_divisor,
            },
        }
    }
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {key}: '{value}'"))
}

fn parse_list(key: &str, value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse(key, part))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.limits.daily_limit_presets, vec![60, 90, 120, 180, 240]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed]\ndeep_content_cutoff = 0.6\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!((config.feed.deep_content_cutoff - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.limits.default_daily_limit_minutes, 120);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed]\nengagement_divisor = 0.0\n").unwrap();

        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.set("limits.daily_limit_presets", "30, 60").unwrap();
        config.set("storage.database_path", "/tmp/moodreel-test.db").unwrap();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get("limits.daily_limit_presets").unwrap(), "30,60");
    }

    #[test]
    fn test_set_rejects_bad_values_without_changing_config() {
        let mut config = AppConfig::default();

        assert!(config.set("feed.engagement_divisor", "-1").is_err());
        assert!(config.set("limits.default_daily_limit_minutes", "abc").is_err());
        assert!(config.set("nope.key", "1").is_err());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_session_options_follow_config() {
        let mut config = AppConfig::default();
        config.set("limits.default_daily_limit_minutes", "90").unwrap();
        config.set("feed.deep_content_cutoff", "0.5").unwrap();

        let options = config.session_options();
        assert_eq!(options.tracker.default_daily_limit_minutes, 90);
        assert!((options.ranker.deep_content_cutoff - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entries_cover_every_key() {
        let config = AppConfig::default();
        let entries = config.entries();
        assert_eq!(entries.len(), AppConfig::KEYS.len());
        assert_eq!(entries[0], ("limits.default_daily_limit_minutes", "120".to_string()));
    }
}
