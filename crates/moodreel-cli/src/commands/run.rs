/// Foreground session loop: accrues usage while running and keeps the timers armed
use anyhow::Result;
use chrono::Utc;
use std::fs::{create_dir_all, OpenOptions};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use moodreel_core::config::get_data_dir;
use moodreel_core::format::format_minutes;
use moodreel_core::{SessionController, UsageTier};

/// A tick arriving this many periods late means the process was suspended
const SUSPEND_FACTOR: u32 = 3;

/// What a run-loop tick should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Count one more minute of usage
    Accrue,
    /// On a break: nothing accrues
    Paused,
    /// Woke up from suspension: check the date before counting
    Resume,
}

/// Decide what a tick means given how long it actually took to arrive
#[must_use]
pub fn classify_tick(elapsed: Duration, period: Duration, on_break: bool) -> TickAction {
    if elapsed > period * SUSPEND_FACTOR {
        TickAction::Resume
    } else if on_break {
        TickAction::Paused
    } else {
        TickAction::Accrue
    }
}

/// Run until Ctrl-C, recording one minute of usage every `minute_seconds`
pub async fn handle_run_command(
    session: &mut SessionController,
    minute_seconds: u64,
) -> Result<()> {
    let period = Duration::from_secs(minute_seconds.max(1));
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticks.tick().await;
    // Wall clock: monotonic time stops while the machine sleeps
    let mut last_tick = Utc::now();

    let start = session.snapshot().await;
    let mut tier = start.tier;
    println!(
        "Session {} running ({} used of {}). Press Ctrl-C to stop.",
        session.id(),
        format_minutes(start.budget.current_usage_minutes),
        format_minutes(start.budget.daily_limit_minutes)
    );
    log::info!("Run loop started, one usage minute every {}s", period.as_secs());

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let now = Utc::now();
                let elapsed = (now - last_tick).to_std().unwrap_or_default();
                last_tick = now;
                let on_break = session.snapshot().await.on_break;

                match classify_tick(elapsed, period, on_break) {
                    TickAction::Resume => {
                        log::info!("Resumed after {}s without ticks", elapsed.as_secs());
                        if session.on_resume().await {
                            println!("New day: usage has been reset.");
                        }
                    }
                    TickAction::Paused => log::debug!("On break, not counting usage"),
                    TickAction::Accrue => session.record_usage(1).await,
                }

                let snapshot = session.snapshot().await;
                if snapshot.tier != tier {
                    tier = snapshot.tier;
                    println!(
                        "[{}] {} used. {}",
                        tier.label(),
                        format_minutes(snapshot.budget.current_usage_minutes),
                        tier.suggestion()
                    );
                    if tier == UsageTier::Critical {
                        println!("Try `moodreel break 5` to step away for a bit.");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Received Ctrl-C, shutting down...");
                break;
            }
        }
    }

    session.dispose();
    let end = session.snapshot().await;
    println!(
        "Stopped. Today: {} of {}",
        format_minutes(end.budget.current_usage_minutes),
        format_minutes(end.budget.daily_limit_minutes)
    );
    Ok(())
}

/// Send logs to `<data dir>/moodreel.log` instead of stderr
///
/// # Errors
///
/// Returns an error if the log file cannot be opened
pub fn setup_file_logging(verbose: bool) -> Result<()> {
    let log_path = get_data_dir()?.join("moodreel.log");

    if let Some(parent) = log_path.parent() {
        create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp_secs()
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tick() {
        let period = Duration::from_secs(60);

        assert_eq!(classify_tick(Duration::from_secs(61), period, false), TickAction::Accrue);
        assert_eq!(classify_tick(Duration::from_secs(60), period, true), TickAction::Paused);
        assert_eq!(classify_tick(Duration::from_secs(181), period, false), TickAction::Resume);
        assert_eq!(classify_tick(Duration::from_secs(3600), period, true), TickAction::Resume);
    }
}
