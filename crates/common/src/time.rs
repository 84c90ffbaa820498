//! Poll-local day boundary computation.
//!
//! A poll aggregates votes per local calendar day in its configured IANA
//! timezone. The "day" key stored in the database is that local midnight
//! expressed as an absolute UTC instant, so DST transitions shift the
//! boundary correctly instead of drifting by a fixed offset.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{AppError, AppResult};

/// Parse an IANA timezone name as stored on a poll.
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::Internal(format!("Invalid poll timezone: {name}")))
}

/// The poll-local midnight containing `now`, as a UTC instant.
#[must_use]
pub fn local_day(tz: Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    local_day_for_date(tz, now.with_timezone(&tz).date_naive())
}

/// The poll-local midnight of the day before the one containing `now`.
#[must_use]
pub fn previous_local_day(tz: Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let yesterday = today.pred_opt().unwrap_or(today);
    local_day_for_date(tz, yesterday)
}

/// The poll-local midnight of a specific calendar date, as a UTC instant.
///
/// When midnight does not exist (a DST gap starting at 00:00, as in
/// America/Santiago), the earliest valid instant of that day is used.
#[must_use]
pub fn local_day_for_date(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let mut candidate = date.and_time(NaiveTime::MIN);
    for _ in 0..12 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(15),
        }
    }
    // No real timezone has a gap this long; interpret as UTC
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
