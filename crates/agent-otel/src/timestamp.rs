//! The wire timestamp format shared with the host runtime.
//!
//! Events carry calendar date-times with microsecond precision
//! (`YYYY-MM-DD HH:MM:SS.ffffff`, UTC). Spans are recorded with explicit
//! instants parsed from these strings, so the parse must be exact and the
//! conversion to [`SystemTime`] lossless at microsecond granularity.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{NaiveDateTime, Utc};

use crate::error::TelemetryError;

/// strftime pattern for the wire format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current UTC time rendered in the wire format.
pub fn current_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a wire-format timestamp into a [`SystemTime`].
///
/// # Errors
///
/// Returns [`TelemetryError::MalformedTimestamp`] if the string does not
/// match the wire format or predates the Unix epoch.
pub fn parse_timestamp(value: &str) -> Result<SystemTime, TelemetryError> {
    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|_| TelemetryError::MalformedTimestamp(value.to_owned()))?;
    let utc = naive.and_utc();
    let secs = utc.timestamp();
    if secs < 0 {
        return Err(TelemetryError::MalformedTimestamp(value.to_owned()));
    }
    Ok(UNIX_EPOCH + Duration::new(secs as u64, utc.timestamp_subsec_nanos()))
}
