use chrono::{DateTime, Utc};

fn clamp_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Format seconds as M:SS (minutes are not padded)
pub fn format_time(seconds: f64) -> String {
    let seconds = clamp_seconds(seconds);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

/// Whole minutes, e.g. "3 min"
pub fn format_minutes(seconds: f64) -> String {
    let mins = (clamp_seconds(seconds) / 60.0).floor() as u64;
    format!("{} min", mins)
}

/// Note creation date, e.g. "Mar 5, 2025"
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    created_at.format("%b %-d, %Y").to_string()
}
