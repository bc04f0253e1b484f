//! Time formatting helpers.

use chrono::{DateTime, Utc};
use factfund_types::TimestampMs;

/// Format a duration in milliseconds to a human-readable string.
pub fn format_duration(millis: u64) -> String {
    let secs = millis / 1000;
    if secs == 0 {
        format!("{millis}ms")
    } else if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` UTC.
pub fn format_timestamp(ts: TimestampMs) -> String {
    i64::try_from(ts.as_millis())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(2_000), "2s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(3_723_000), "1h 2m");
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(
            format_timestamp(TimestampMs::new(1_700_000_000_000)),
            "2023-11-14 22:13"
        );
        assert_eq!(format_timestamp(TimestampMs::EPOCH), "1970-01-01 00:00");
    }
}
