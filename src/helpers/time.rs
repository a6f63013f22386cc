use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Render a unix timestamp for logs, falling back to the raw number
pub fn display_unix_ts(unix_ts: i64) -> String {
    DateTime::from_timestamp(unix_ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| unix_ts.to_string())
}
