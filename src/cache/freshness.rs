//! Freshness evaluation for cached entries
//!
//! Decides hit vs. stale: an entry is fresh while its age is strictly less
//! than the configured threshold, so an entry stored exactly one threshold
//! ago is already stale.

use chrono::{DateTime, Duration, Utc};

/// Default freshness window, in minutes, applied when none is configured
pub const DEFAULT_CACHE_THRESHOLD_MINUTES: i64 = 1;

/// Returns `true` iff an entry stored at `stored_at` is still fresh at `now`
///
/// The comparison is strictly "after" (`stored_at > now - threshold`), never
/// "at or after": the exact boundary counts as stale. Callers sample `now`
/// once per lookup rather than reusing an earlier timestamp, so a single
/// check cannot drift.
pub fn is_fresh(stored_at: DateTime<Utc>, threshold: Duration, now: DateTime<Utc>) -> bool {
    stored_at > now - threshold
}
