/// Feed, mood, energy and mode command handlers
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tabled::{Table, Tabled};

use moodreel_core::format::format_media_duration;
use moodreel_core::{ContentItem, FeedRanker, Mode, Mood, SessionController};

use super::helpers::{read_json, truncate_str};

#[derive(Tabled)]
struct FeedRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Mode")]
    mode: &'static str,
    #[tabled(rename = "Energy")]
    energy: u8,
    #[tabled(rename = "Engagement")]
    engagement: u64,
    #[tabled(rename = "Score")]
    score: String,
}

#[derive(Tabled)]
struct ModeRow {
    #[tabled(rename = "Mode")]
    mode: &'static str,
    #[tabled(rename = "Shortest")]
    shortest: String,
    #[tabled(rename = "Longest")]
    longest: String,
}

/// Load a catalog: either a JSON array of items or an object with an `items` array
///
/// # Errors
///
/// Returns an error if the file is unreadable or an item is malformed
pub fn load_catalog(path: &Path) -> Result<Vec<ContentItem>> {
    let items = match read_json(path)? {
        Value::Object(mut map) => map.remove("items").unwrap_or(Value::Object(map)),
        other => other,
    };
    serde_json::from_value(items)
        .with_context(|| format!("Invalid content catalog in {}", path.display()))
}

/// Usage ratio to rank at: an explicit one must be finite and not negative
///
/// # Errors
///
/// Returns an error if `ratio` is NaN, infinite or below zero
pub fn check_ratio(ratio: f64) -> Result<f64> {
    if !ratio.is_finite() || ratio < 0.0 {
        anyhow::bail!("--ratio must be a finite number of at least 0, got {ratio}");
    }
    Ok(ratio)
}

fn feed_rows(ranker: &FeedRanker, items: &[ContentItem]) -> Vec<FeedRow> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| FeedRow {
            position: index + 1,
            id: truncate_str(item.id(), 24),
            mode: item.mode().as_str(),
            energy: item.energy_score(),
            engagement: item.engagement_count(),
            score: format!("{:.3}", ranker.score(item)),
        })
        .collect()
}

pub async fn handle_feed_command(
    session: &SessionController,
    catalog: &Path,
    mood: Option<Mood>,
    ratio: Option<f64>,
    json: bool,
) -> Result<()> {
    let items = load_catalog(catalog)?;
    let mood = mood.unwrap_or_else(|| session.mood());

    let usage_ratio = match ratio {
        Some(ratio) => check_ratio(ratio)?,
        None => session.snapshot().await.usage_ratio,
    };
    let ranker = *session.ranker();
    let feed = ranker.rank(&items, mood, usage_ratio);

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }

    println!(
        "\n{} feed at {:.0}% of today's budget ({} of {} items)",
        mood.name(),
        usage_ratio * 100.0,
        feed.len(),
        items.len()
    );
    if !ranker.allows_deep_content(usage_ratio) {
        println!("Deep content is hidden for the rest of the day.");
    }
    if feed.is_empty() {
        println!("Nothing to show for this mood.");
        return Ok(());
    }

    println!("{}", Table::new(feed_rows(&ranker, &feed)));
    Ok(())
}

pub fn handle_mood_command(session: &mut SessionController, mood: Option<Mood>) -> Result<()> {
    if let Some(mood) = mood {
        session.set_mood(mood);
        println!("Mood set to {} - {}", mood.name(), mood.description());
        return Ok(());
    }

    let current = session.mood();
    for mood in Mood::ALL {
        let marker = if mood == current { "*" } else { " " };
        println!("{marker} {:<6} {:<12} {}", mood.as_str(), mood.name(), mood.description());
    }
    Ok(())
}

pub fn handle_energy_command(session: &mut SessionController, add: Option<u8>) -> Result<()> {
    if let Some(points) = add {
        session.increment_energy_score(points);
    }
    let rank = session.creator_rank();
    println!("Energy score: {}/100 ({})", session.energy_score(), rank.name());
    Ok(())
}

pub fn handle_modes_command(check: Option<(Mode, u32)>) -> Result<()> {
    if let Some((mode, seconds)) = check {
        let verdict = if mode.accepts_duration(seconds) { "fits" } else { "does not fit" };
        println!("{} {verdict} {mode} mode", format_media_duration(seconds));
        return Ok(());
    }

    let rows: Vec<ModeRow> = [Mode::Spark, Mode::Deep]
        .into_iter()
        .map(|mode| {
            let bounds = mode.duration_bounds_secs();
            ModeRow {
                mode: mode.as_str(),
                shortest: format_media_duration(*bounds.start()),
                longest: format_media_duration(*bounds.end()),
            }
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}
