use chrono::{DateTime, Utc};
use pitlane_http::ClientError;

const UNITS: [(&str, f64); 5] = [
    ("years", 31_536_000.0),
    ("months", 2_592_000.0),
    ("days", 86_400.0),
    ("hours", 3_600.0),
    ("minutes", 60.0),
];

/// Renders the age of `timestamp` relative to `now`, e.g. `"3 hours ago"`.
///
/// The largest unit that fits more than once wins and the count is floored.
/// Unit names are always plural. Timestamps in the future read as zero.
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - timestamp).num_seconds().max(0);
    let seconds = elapsed as f64;

    for (unit, length) in UNITS {
        let interval = seconds / length;
        if interval > 1.0 {
            return format!("{} {unit} ago", interval.floor() as i64);
        }
    }

    format!("{elapsed} seconds ago")
}

/// Same as [`format_relative`] for an RFC 3339 timestamp as sent by the API
pub fn time_ago(timestamp: &str, now: DateTime<Utc>) -> Result<String, ClientError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc);
    Ok(format_relative(parsed, now))
}

pub fn time_ago_now(timestamp: DateTime<Utc>) -> String {
    format_relative(timestamp, Utc::now())
}
