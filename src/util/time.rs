use chrono::{DateTime, NaiveDateTime};

/// `2024-03-01T09:15:00Z` -> `2024-03-01`
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

// Offset markers are dropped, not converted.
pub fn display_timestamp(timestamp: &str) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.naive_local().format(FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S") {
        return dt.format(FORMAT).to_string();
    }
    timestamp
        .replacen('T', " ", 1)
        .trim_end_matches('Z')
        .to_string()
}
