//! Time Utilities

use chrono::{DateTime, SecondsFormat, Utc};

pub const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Current time as fractional seconds since the Unix epoch
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Format an epoch timestamp as an RFC 3339 string (UTC, microsecond precision)
///
/// Returns `None` for values chrono cannot represent (NaN, out of range).
pub fn format_timestamp(timestamp: f64) -> Option<String> {
    if !timestamp.is_finite() {
        return None;
    }
    let micros = (timestamp * 1_000_000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_micros(micros as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Micros, true))
}
