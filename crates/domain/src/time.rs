//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for reading times, command issue times and events.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Build a timestamp from whole unix seconds, as carried on the wire.
///
/// Returns `None` when the value is outside chrono's representable range.
#[must_use]
pub fn from_unix_secs(secs: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, 0)
}
