//! Booking clock: civil (date, time, zone) readings to UTC instants, plus the
//! relative predicates that classify a booking's lifecycle stage.
//!
//! All comparisons are instant-to-instant. Wall-clock strings never get
//! compared directly, so results stay correct across DST transitions and for
//! bookings created in different zones.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// A civil time specification we refuse to interpret. Raised instead of
/// letting malformed input flow into silently-wrong arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeSpecError {
    #[error("invalid calendar date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid clock time {0:?} (expected HH:MM)")]
    InvalidTime(String),
    #[error("unknown timezone {0:?}")]
    InvalidZone(String),
    #[error("local time {date} {time} cannot be mapped in {zone}")]
    Unresolvable {
        date: String,
        time: String,
        zone: String,
    },
}

/// Parses an IANA zone identifier (e.g. "America/St_Johns") via the bundled
/// tz database.
pub fn parse_zone(name: &str) -> Result<Tz, TimeSpecError> {
    name.parse()
        .map_err(|_| TimeSpecError::InvalidZone(name.to_string()))
}

fn parse_date(date: &str) -> Result<NaiveDate, TimeSpecError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| TimeSpecError::InvalidDate(date.to_string()))
}

fn parse_time(time: &str) -> Result<NaiveTime, TimeSpecError> {
    // Backend payloads are HH:MM; tolerate trailing seconds.
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| TimeSpecError::InvalidTime(time.to_string()))
}

/// Resolves a local wall-clock reading to the instant it names in `tz`,
/// using the zone's offset as observed on that calendar date.
///
/// DST rule (authoritative): an ambiguous fall-back reading takes the
/// earliest (pre-transition) instant; a nonexistent spring-forward reading
/// is pushed one hour forward and resolved there.
pub fn resolve_local_instant(
    date: &str,
    time: &str,
    tz: Tz,
) -> Result<DateTime<Utc>, TimeSpecError> {
    let naive = parse_date(date)?.and_time(parse_time(time)?);
    resolve_naive(naive, tz).ok_or_else(|| TimeSpecError::Unresolvable {
        date: date.to_string(),
        time: time.to_string(),
        zone: tz.name().to_string(),
    })
}

fn resolve_naive(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    // earliest() picks the pre-transition reading of an ambiguous time and
    // is None inside a gap, where the shifted retry lands on solid ground.
    naive
        .and_local_timezone(tz)
        .earliest()
        .or_else(|| (naive + Duration::hours(1)).and_local_timezone(tz).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats an instant back into (YYYY-MM-DD, HH:MM) as read in `tz`.
/// Round-trips with [`resolve_local_instant`] outside DST gaps/ambiguities.
pub fn local_civil(instant: DateTime<Utc>, tz: Tz) -> (String, String) {
    let local = instant.with_timezone(&tz);
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// Signed hours from `from` to `to`; negative when `to` is earlier.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

pub fn is_past(date: &str, time: &str, tz: Tz, now: DateTime<Utc>) -> Result<bool, TimeSpecError> {
    Ok(resolve_local_instant(date, time, tz)? < now)
}

pub fn is_upcoming(
    date: &str,
    time: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<bool, TimeSpecError> {
    Ok(resolve_local_instant(date, time, tz)? > now)
}

/// True when `now` lies in the closed interval [start, end] resolved on the
/// given civil date.
pub fn is_active(
    date: &str,
    start: &str,
    end: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<bool, TimeSpecError> {
    Ok(!is_upcoming(date, start, tz, now)? && !is_past_end(date, end, tz, now)?)
}

pub fn is_past_end(
    date: &str,
    end: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<bool, TimeSpecError> {
    Ok(resolve_local_instant(date, end, tz)? < now)
}

/// Signed hours between the resolved reading and `now`; negative once past.
pub fn hours_until(
    date: &str,
    time: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<f64, TimeSpecError> {
    Ok(hours_between(now, resolve_local_instant(date, time, tz)?))
}
