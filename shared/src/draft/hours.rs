//! Office opening hours on the wire: 100 ns ticks since local midnight.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const TICKS_PER_MILLISECOND: i64 = 10_000;

#[must_use]
pub fn ticks_since_midnight(time: NaiveTime) -> i64 {
    let seconds = i64::from(time.num_seconds_from_midnight());
    // Leap-second representations carry nanos >= 1e9.
    let millis = i64::from((time.nanosecond() % 1_000_000_000) / 1_000_000);
    (seconds * 1_000 + millis) * TICKS_PER_MILLISECOND
}

/// Inverse of [`ticks_since_midnight`] at millisecond resolution. `0` and
/// out-of-range values mean "not set".
#[must_use]
pub fn time_from_ticks(ticks: i64) -> Option<NaiveTime> {
    if ticks <= 0 {
        return None;
    }
    let millis = ticks / TICKS_PER_MILLISECOND;
    let seconds = u32::try_from(millis / 1_000).ok()?;
    let nanos = u32::try_from((millis % 1_000) * 1_000_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub begin_time: i64,
    pub end_time: i64,
}

/// Both times are sent only when both are set; otherwise both are `0`.
#[must_use]
pub fn encode_hours(begin: Option<NaiveTime>, end: Option<NaiveTime>) -> OpeningHours {
    match (begin, end) {
        (Some(begin), Some(end)) => OpeningHours {
            begin_time: ticks_since_midnight(begin),
            end_time: ticks_since_midnight(end),
        },
        _ => OpeningHours::default(),
    }
}
