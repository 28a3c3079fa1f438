//! Helper functions for CLI operations

use chrono::{DateTime, Utc};

/// Formats Unix timestamp to readable date
pub fn format_timestamp(timestamp: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Formats the wall time between two Unix timestamps
pub fn format_elapsed(started_at: i64, finished_at: i64) -> String {
    let secs = (finished_at - started_at).max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// First 8 characters of a commit SHA
pub fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}
