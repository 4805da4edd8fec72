//! Human-readable durations for usage bars, break countdowns and clips.

/// Minutes as `"1h 30m"` or `"45m"`
#[must_use]
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Break countdown as `"m:ss"`
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Clip length: `"45s"`, `"1:05"`, `"5m"` or `"1h 2m"`
#[must_use]
pub fn format_media_duration(seconds: u32) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        let remaining = seconds % 60;
        if remaining > 0 {
            format!("{minutes}:{remaining:02}")
        } else {
            format!("{minutes}m")
        }
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
