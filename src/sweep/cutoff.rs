//! Retention cutoff computation.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Midnight UTC of the day `days` before `now`.
///
/// The time-of-day component is dropped deliberately: the sweep boundary is
/// always midnight of the cutoff day, so two runs on the same calendar day
/// with the same offset target the same instant.
pub fn retention_cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    (now - Duration::days(i64::from(days)))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
