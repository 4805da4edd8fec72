/// Usage budget command handlers (status, usage, reset, limit, break)
use anyhow::Result;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::interval;

use moodreel_core::format::{format_countdown, format_minutes};
use moodreel_core::{AppConfig, SessionController, UsageSnapshot};

use super::helpers::{check_preset, progress_bar};

const BAR_WIDTH: usize = 30;

/// Render a usage snapshot as the lines printed by `status`
pub fn render_status(snapshot: &UsageSnapshot) -> Vec<String> {
    let budget = &snapshot.budget;
    let mut lines = vec![
        format!(
            "Usage: {} / {} ({:.0}%)",
            format_minutes(budget.current_usage_minutes),
            format_minutes(budget.daily_limit_minutes),
            snapshot.usage_ratio * 100.0
        ),
        format!("{} {}", progress_bar(snapshot.display_ratio, BAR_WIDTH), snapshot.tier.label()),
        format!("Suggestion: {}", snapshot.suggestion),
    ];
    if snapshot.show_time_warning {
        lines.push("Warning: you are close to your daily limit".to_string());
    }
    if snapshot.on_break {
        lines.push(format!(
            "On break: {} remaining",
            format_countdown(budget.break_remaining_seconds)
        ));
    }
    if let Some(date) = budget.last_reset_date {
        lines.push(format!("Last reset: {date}"));
    }
    lines
}

pub async fn handle_status_command(session: &SessionController, json: bool) -> Result<()> {
    let snapshot = session.snapshot().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Mood: {} | Energy: {}", session.mood().name(), session.energy_score());
    for line in render_status(&snapshot) {
        println!("{line}");
    }
    Ok(())
}

pub async fn handle_usage_add(session: &SessionController, minutes: u32) -> Result<()> {
    session.record_usage(minutes).await;
    let snapshot = session.snapshot().await;
    println!(
        "Recorded {}. Today: {} of {}",
        format_minutes(minutes),
        format_minutes(snapshot.budget.current_usage_minutes),
        format_minutes(snapshot.budget.daily_limit_minutes)
    );
    Ok(())
}

pub async fn handle_reset_command(session: &SessionController) -> Result<()> {
    session.reset_daily_usage().await;
    println!("Today's usage has been reset.");
    Ok(())
}

pub async fn handle_limit_command(
    session: &SessionController,
    config: &AppConfig,
    minutes: Option<u32>,
    custom: bool,
) -> Result<()> {
    let Some(minutes) = minutes else {
        let current = session.snapshot().await.budget.daily_limit_minutes;
        println!("Daily limit: {}", format_minutes(current));
        println!("\nPresets:");
        for preset in &config.limits.daily_limit_presets {
            let marker = if *preset == current { "*" } else { " " };
            println!("  {marker} {}", format_minutes(*preset));
        }
        return Ok(());
    };

    let minutes = check_preset("daily limit", minutes, &config.limits.daily_limit_presets, custom)?;
    session.set_daily_limit(minutes).await?;
    println!("Daily limit set to {}", format_minutes(minutes));
    Ok(())
}

/// Start a break and count it down in the foreground; Ctrl-C cancels it
pub async fn handle_break_command(
    session: &mut SessionController,
    config: &AppConfig,
    minutes: u32,
    custom: bool,
) -> Result<()> {
    let minutes = check_preset("break", minutes, &config.limits.break_presets_minutes, custom)?;
    session.start_break(minutes).await?;
    println!("Break started for {}. Press Ctrl-C to cancel.", format_minutes(minutes));

    let tracker = session.tracker();
    let mut ticks = interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let remaining = tracker.lock().await.budget().break_remaining_seconds;
                if remaining == 0 {
                    println!("\rBreak finished. Welcome back!    ");
                    break;
                }
                print!("\rBreak remaining: {}  ", format_countdown(remaining));
                io::stdout().flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                session.cancel_break().await;
                println!("\nBreak cancelled.");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moodreel_core::{UsageBudget, UsageTier};

    fn snapshot(current: u32, limit: u32, break_seconds: u32) -> UsageSnapshot {
        let mut budget = UsageBudget::new(limit, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        budget.current_usage_minutes = current;
        budget.break_remaining_seconds = break_seconds;
        let ratio = budget.usage_ratio();
        let tier = UsageTier::classify(ratio);
        UsageSnapshot {
            usage_ratio: ratio,
            display_ratio: ratio.clamp(0.0, 1.0),
            tier,
            suggestion: tier.suggestion(),
            on_break: break_seconds > 0,
            show_time_warning: f64::from(current) > f64::from(limit) * 0.8,
            budget,
        }
    }

    #[test]
    fn test_render_status_normal() {
        let lines = render_status(&snapshot(30, 120, 0));

        assert_eq!(lines[0], "Usage: 30m / 2h 0m (25%)");
        assert!(lines[1].ends_with("normal"));
        assert!(lines.iter().all(|l| !l.starts_with("Warning")));
        assert!(lines.iter().all(|l| !l.starts_with("On break")));
        assert_eq!(lines.last().unwrap(), "Last reset: 2024-03-10");
    }

    #[test]
    fn test_render_status_warning_and_break() {
        let lines = render_status(&snapshot(110, 120, 125));

        assert!(lines[1].ends_with("critical"));
        assert!(lines.contains(&"Warning: you are close to your daily limit".to_string()));
        assert!(lines.contains(&"On break: 2:05 remaining".to_string()));
    }
}
