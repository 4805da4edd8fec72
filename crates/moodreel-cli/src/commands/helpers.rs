//! Helper utility functions for CLI commands

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use moodreel_core::{AppConfig, LogSink, SessionController, SystemClock};
use moodreel_storage::{Database, KeyValueStore, MemoryStore};

/// Where the CLI keeps its state for this invocation
#[derive(Debug, Clone, Default)]
pub struct StoreArgs {
    /// Explicit database path from `--db`
    pub db: Option<PathBuf>,
    /// `--ephemeral`: keep everything in memory
    pub ephemeral: bool,
}

impl StoreArgs {
    /// Database path: `--db`, then `storage.database_path`, then the default location
    #[must_use]
    pub fn db_path(&self, config: &AppConfig) -> PathBuf {
        self.db
            .clone()
            .or_else(|| config.storage.database_path.clone())
            .unwrap_or_else(Database::default_db_path)
    }
}

/// Open the SQLite database this invocation should use
///
/// # Errors
///
/// Returns an error in ephemeral mode or if the database cannot be opened
pub fn open_database(args: &StoreArgs, config: &AppConfig) -> Result<Database> {
    if args.ephemeral {
        anyhow::bail!("Nothing is persisted in --ephemeral mode");
    }
    Database::new(Some(args.db_path(config)))
}

/// Open the key-value store backing the session
///
/// # Errors
///
/// Returns an error if the database cannot be opened
pub fn open_store(args: &StoreArgs, config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    if args.ephemeral {
        log::debug!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(open_database(args, config)?))
}

/// Start a session against the configured store and the system clock
///
/// # Errors
///
/// Returns an error if the store cannot be opened
pub async fn open_session(args: &StoreArgs, config: &AppConfig) -> Result<SessionController> {
    let store = open_store(args, config)?;
    Ok(SessionController::init(
        store,
        Arc::new(SystemClock),
        Arc::new(LogSink),
        config.session_options(),
    )
    .await)
}

/// Read and parse a JSON document
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON
pub fn read_json(path: &Path) -> Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Check a minute value against the offered presets unless `custom` is set
///
/// # Errors
///
/// Returns an error naming the presets when `minutes` is not one of them
pub fn check_preset(what: &str, minutes: u32, presets: &[u32], custom: bool) -> Result<u32> {
    if custom || presets.contains(&minutes) {
        return Ok(minutes);
    }
    let offered = presets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    anyhow::bail!("{minutes} is not a {what} preset ({offered}). Pass --custom to use it anyway")
}

/// Safely truncate a string to a maximum number of characters (not bytes).
/// This avoids panics when slicing multi-byte UTF-8 characters.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Text progress bar for a ratio, clamped to `[0, 1]`
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
