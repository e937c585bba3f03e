//! Timestamp formatting for displaying segment and placement times.
//!
//! Supports `HH:MM:SS`, `HH:MM:SS.mmm`, `MM:SS` and plain seconds.

use thiserror::Error;

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use lipsync_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("00:01:30").unwrap(), 90.0);
/// assert_eq!(parse_timestamp("02:05.5").unwrap(), 125.5);
/// assert_eq!(parse_timestamp("3.25").unwrap(), 3.25);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    const NAMES: [&str; 3] = ["seconds", "minutes", "hours"];
    let mut total = 0.0;
    let mut scale = 1.0;
    for (i, part) in parts.iter().rev().enumerate() {
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(NAMES[i], part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total += value * scale;
        scale *= 60.0;
    }

    Ok(total)
}

/// Format seconds into `HH:MM:SS` or `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let millis_total = (total_secs * 1000.0).round() as u64;
    let hours = millis_total / 3_600_000;
    let mins = (millis_total % 3_600_000) / 60_000;
    let secs = (millis_total % 60_000) / 1000;
    let millis = millis_total % 1000;

    if millis > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, HH:MM:SS.mmm, MM:SS, or SS")]
    InvalidFormat(String),
}
