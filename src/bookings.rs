//! Booking lifecycle classification and schedule partitioning.
//!
//! A booking's civil fields (date, start, end, zone) are resolved to instants
//! once, then all stage decisions compare instants. Records that cannot be
//! resolved are surfaced with a reason instead of being dropped.

use chrono::{DateTime, Utc};

use crate::backend::BookingRecord;
use crate::clock::{self, TimeSpecError};
use crate::domain::BookingPhase;

/// A booking with its schedule resolved to UTC instants.
#[derive(Debug, Clone)]
pub struct ScheduledBooking {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub booking: BookingRecord,
}

impl ScheduledBooking {
    pub fn phase(&self, now: DateTime<Utc>) -> BookingPhase {
        phase_of(self.starts_at, self.ends_at, now)
    }

    /// Signed hours until the booking starts; negative once it has.
    pub fn starts_in_hours(&self, now: DateTime<Utc>) -> f64 {
        clock::hours_between(now, self.starts_at)
    }

    pub fn ends_in_hours(&self, now: DateTime<Utc>) -> f64 {
        clock::hours_between(now, self.ends_at)
    }
}

fn window(booking: &BookingRecord) -> Result<(DateTime<Utc>, DateTime<Utc>), TimeSpecError> {
    let tz = clock::parse_zone(&booking.timezone)?;
    Ok((
        clock::resolve_local_instant(&booking.date, &booking.start_time, tz)?,
        clock::resolve_local_instant(&booking.date, &booking.end_time, tz)?,
    ))
}

/// Resolves both ends of a booking's window in its own zone. Fails on the
/// first malformed field, so a record is either fully usable or rejected.
pub fn resolve_schedule(booking: BookingRecord) -> Result<ScheduledBooking, TimeSpecError> {
    let (starts_at, ends_at) = window(&booking)?;
    Ok(ScheduledBooking {
        starts_at,
        ends_at,
        booking,
    })
}

/// Classifies one booking relative to `now`.
pub fn classify(booking: &BookingRecord, now: DateTime<Utc>) -> Result<BookingPhase, TimeSpecError> {
    let (starts_at, ends_at) = window(booking)?;
    Ok(phase_of(starts_at, ends_at, now))
}

/// Signed hours until the booking's start, resolved in its own zone;
/// negative once it has begun.
pub fn hours_until_start(
    booking: &BookingRecord,
    now: DateTime<Utc>,
) -> Result<f64, TimeSpecError> {
    let tz = clock::parse_zone(&booking.timezone)?;
    clock::hours_until(&booking.date, &booking.start_time, tz, now)
}

// The one place the stage decision lives. The window is closed at both ends,
// matching clock::is_active.
fn phase_of(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, now: DateTime<Utc>) -> BookingPhase {
    if starts_at > now {
        BookingPhase::Upcoming
    } else if ends_at < now {
        BookingPhase::Past
    } else {
        BookingPhase::Active
    }
}

#[derive(Debug, Default)]
pub struct SchedulePartition {
    pub upcoming: Vec<ScheduledBooking>,
    pub active: Vec<ScheduledBooking>,
    pub past: Vec<ScheduledBooking>,
    /// (booking id, reason) for records whose schedule did not resolve.
    pub invalid: Vec<(i64, TimeSpecError)>,
}

/// Buckets a location's bookings by lifecycle stage relative to `now`.
/// Upcoming sorts soonest first, past most recent first.
pub fn partition(bookings: Vec<BookingRecord>, now: DateTime<Utc>) -> SchedulePartition {
    let mut out = SchedulePartition::default();
    for booking in bookings {
        let id = booking.id;
        match resolve_schedule(booking) {
            Ok(scheduled) => match scheduled.phase(now) {
                BookingPhase::Upcoming => out.upcoming.push(scheduled),
                BookingPhase::Active => out.active.push(scheduled),
                BookingPhase::Past => out.past.push(scheduled),
            },
            Err(err) => out.invalid.push((id, err)),
        }
    }
    out.upcoming.sort_by_key(|s| s.starts_at);
    out.active.sort_by_key(|s| s.starts_at);
    out.past.sort_by_key(|s| std::cmp::Reverse(s.starts_at));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn booking(id: i64, date: &str, start: &str, end: &str, tz: &str) -> BookingRecord {
        BookingRecord {
            id,
            kitchen_id: 1,
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            timezone: tz.to_string(),
            status: "confirmed".to_string(),
        }
    }

    #[test]
    fn classify_walks_the_lifecycle() {
        // 14:00-16:00 in St. John's (NDT, UTC-2:30) is 16:30Z-18:30Z.
        let b = booking(1, "2024-07-15", "14:00", "16:00", "America/St_Johns");
        assert_eq!(
            classify(&b, utc(2024, 7, 15, 16, 0)).unwrap(),
            BookingPhase::Upcoming
        );
        assert_eq!(
            classify(&b, utc(2024, 7, 15, 17, 0)).unwrap(),
            BookingPhase::Active
        );
        assert_eq!(
            classify(&b, utc(2024, 7, 15, 19, 31)).unwrap(),
            BookingPhase::Past
        );
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let b = booking(1, "2024-07-15", "14:00", "16:00", "America/St_Johns");
        assert_eq!(
            classify(&b, utc(2024, 7, 15, 16, 30)).unwrap(),
            BookingPhase::Active
        );
        assert_eq!(
            classify(&b, utc(2024, 7, 15, 18, 30)).unwrap(),
            BookingPhase::Active
        );
    }

    #[test]
    fn winter_bookings_use_the_standard_offset() {
        // Same wall-clock window in January resolves an hour's worth of
        // offset later (NST, UTC-3:30): 17:30Z-19:30Z.
        let b = booking(1, "2024-01-15", "14:00", "16:00", "America/St_Johns");
        assert_eq!(
            classify(&b, utc(2024, 1, 15, 17, 0)).unwrap(),
            BookingPhase::Upcoming
        );
        assert_eq!(
            classify(&b, utc(2024, 1, 15, 17, 30)).unwrap(),
            BookingPhase::Active
        );
    }

    #[test]
    fn partition_buckets_and_orders() {
        let now = utc(2024, 7, 15, 17, 0);
        let records = vec![
            booking(1, "2024-07-16", "09:00", "11:00", "America/St_Johns"),
            booking(2, "2024-07-15", "15:00", "17:00", "America/St_Johns"),
            booking(3, "2024-07-15", "14:00", "16:00", "America/St_Johns"),
            booking(4, "2024-07-14", "09:00", "10:00", "America/St_Johns"),
            booking(5, "2024-07-15", "10:00", "11:00", "America/St_Johns"),
            booking(6, "2024-07-15", "10:00", "11:00", "Nowhere/Land"),
        ];

        let parts = partition(records, now);

        let upcoming: Vec<i64> = parts.upcoming.iter().map(|s| s.booking.id).collect();
        assert_eq!(upcoming, vec![2, 1], "soonest first");

        let active: Vec<i64> = parts.active.iter().map(|s| s.booking.id).collect();
        assert_eq!(active, vec![3]);

        let past: Vec<i64> = parts.past.iter().map(|s| s.booking.id).collect();
        assert_eq!(past, vec![5, 4], "most recent first");

        assert_eq!(parts.invalid.len(), 1);
        assert_eq!(parts.invalid[0].0, 6);
        assert!(matches!(parts.invalid[0].1, TimeSpecError::InvalidZone(_)));
    }

    #[test]
    fn malformed_time_reports_a_reason() {
        let b = booking(9, "2024-07-15", "25:00", "26:00", "America/St_Johns");
        assert_eq!(
            classify(&b, utc(2024, 7, 15, 12, 0)),
            Err(TimeSpecError::InvalidTime("25:00".to_string()))
        );
    }

    #[test]
    fn future_booking_with_broken_end_is_still_rejected() {
        let b = booking(9, "2099-01-01", "10:00", "99:99", "America/St_Johns");
        let parts = partition(vec![b], utc(2024, 7, 15, 12, 0));
        assert!(parts.upcoming.is_empty());
        assert_eq!(parts.invalid.len(), 1);
    }

    #[test]
    fn scheduled_hours_are_signed() {
        let s = resolve_schedule(booking(1, "2024-07-15", "14:00", "16:00", "America/St_Johns"))
            .unwrap();
        let h = s.starts_in_hours(utc(2024, 7, 15, 15, 30));
        assert!((h - 1.0).abs() < 1e-9);
        let h = s.ends_in_hours(utc(2024, 7, 15, 19, 30));
        assert!((h + 1.0).abs() < 1e-9);
    }

    #[test]
    fn hours_until_start_matches_the_resolved_instant() {
        let b = booking(1, "2024-07-15", "14:00", "16:00", "America/St_Johns");
        let h = hours_until_start(&b, utc(2024, 7, 15, 14, 30)).unwrap();
        assert!((h - 2.0).abs() < 1e-9);
        let h = hours_until_start(&b, utc(2024, 7, 15, 17, 30)).unwrap();
        assert!((h + 1.0).abs() < 1e-9);
    }
}
