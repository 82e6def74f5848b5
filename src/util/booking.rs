//! Booking time rules and status presentation.
//!
//! RULES
//! =====
//! - A new pickup must be at least 48 hours away.
//! - A booking may be cancelled until 24 hours before pickup.
//! - Cancelled and completed bookings are read-only.
//!
//! Timestamps from the backend are RFC 3339, or naive ISO date-times that
//! are taken as UTC. Unparseable input never passes a rule.

#[cfg(test)]
#[path = "booking_test.rs"]
mod booking_test;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::net::types::BookingStatus;

pub const MIN_BOOKING_LEAD: Duration = Duration::hours(48);
pub const MIN_CANCELLATION_LEAD: Duration = Duration::hours(24);

/// Parse a backend timestamp. Naive values are read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(at);
    }
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]");
    PrimitiveDateTime::parse(raw, naive).ok().map(PrimitiveDateTime::assume_utc)
}

/// Whether a pickup at `pickup` may still be booked at `now`.
#[must_use]
pub fn is_bookable_at(pickup: &str, now: OffsetDateTime) -> bool {
    parse_timestamp(pickup).is_some_and(|at| at - now >= MIN_BOOKING_LEAD)
}

/// Whether a booking picking up at `pickup` may be cancelled at `now`.
#[must_use]
pub fn can_cancel_at(pickup: &str, now: OffsetDateTime) -> bool {
    parse_timestamp(pickup).is_some_and(|at| at - now >= MIN_CANCELLATION_LEAD)
}

#[must_use]
pub fn status_label(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::PendingEmailConfirmation => "Pending",
        BookingStatus::Confirmed => "Confirmed",
        BookingStatus::Cancelled => "Cancelled",
        BookingStatus::Completed => "Completed",
    }
}

#[must_use]
pub fn can_edit(status: BookingStatus) -> bool {
    !matches!(status, BookingStatus::Cancelled | BookingStatus::Completed)
}
