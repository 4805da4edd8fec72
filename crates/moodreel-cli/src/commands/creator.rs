/// Creator rank and achievements command handler
use anyhow::{Context, Result};
use std::path::Path;
use tabled::{Table, Tabled};

use moodreel_core::creator::{achievement_progress, ACHIEVEMENTS};
use moodreel_core::CreatorStats;

use super::helpers::read_json;

#[derive(Tabled)]
struct AchievementRow {
    #[tabled(rename = "Achievement")]
    name: &'static str,
    #[tabled(rename = "Rarity")]
    rarity: String,
    #[tabled(rename = "Description")]
    description: &'static str,
    #[tabled(rename = "Unlocked")]
    unlocked: &'static str,
}

/// Read creator counters from a JSON file
///
/// # Errors
///
/// Returns an error if the file is unreadable or the counters are malformed
pub fn load_stats(path: &Path) -> Result<CreatorStats> {
    serde_json::from_value(read_json(path)?)
        .with_context(|| format!("Invalid creator stats in {}", path.display()))
}

fn achievement_rows(stats: &CreatorStats) -> Vec<AchievementRow> {
    ACHIEVEMENTS
        .iter()
        .map(|achievement| AchievementRow {
            name: achievement.name,
            rarity: format!("{:?}", achievement.rarity),
            description: achievement.description,
            unlocked: if achievement.is_unlocked(stats) { "yes" } else { "no" },
        })
        .collect()
}

pub fn handle_creator_command(stats_path: &Path) -> Result<()> {
    let stats = load_stats(stats_path)?;
    let rank = stats.rank();
    let range = rank.energy_range();

    println!(
        "Creator rank: {} (energy {} in {}-{})",
        rank.name(),
        stats.energy_level,
        range.start(),
        range.end()
    );
    println!(
        "Videos: {} | Followers: {} | Top video views: {}",
        stats.videos, stats.followers, stats.top_video_views
    );
    println!("Achievements: {}% unlocked\n", achievement_progress(&stats));
    println!("{}", Table::new(achievement_rows(&stats)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_stats_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, r#"{"videos": 1, "topVideoViews": 150, "energyLevel": 40}"#).unwrap();

        let stats = load_stats(&path).unwrap();
        let rows = achievement_rows(&stats);

        assert_eq!(rows.len(), ACHIEVEMENTS.len());
        let unlocked: Vec<&str> = rows
            .iter()
            .filter(|r| r.unlocked == "yes")
            .map(|r| r.name)
            .collect();
        assert_eq!(unlocked, vec!["First Spark", "Rising Star"]);
    }

    #[test]
    fn test_load_stats_rejects_wrong_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, r#"{"videos": "many"}"#).unwrap();

        assert!(load_stats(&path).is_err());
    }
}
