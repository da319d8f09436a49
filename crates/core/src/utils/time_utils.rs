use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Current instant truncated to microseconds.
///
/// Stored timestamps keep microsecond precision, so every timestamp the
/// domain hands out is truncated the same way. A value read back from the
/// store then compares equal to the one that was written.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Converts a UTC instant to the naive form used by the storage layer.
pub fn to_naive_utc(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc()
}

/// Interprets a naive storage timestamp as UTC.
pub fn from_naive_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive, Utc)
}
