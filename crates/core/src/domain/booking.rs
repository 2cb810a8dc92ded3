use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::BikeId;
use crate::domain::coupon::CouponCode;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Extended,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub bike_id: BikeId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub total: Decimal,
    #[serde(default)]
    pub coupon_code: Option<CouponCode>,
}

impl Booking {
    /// A booking can only be extended once it is running; an extended booking
    /// may be extended again.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self.status, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Active)
                | (BookingStatus::Active, BookingStatus::Extended)
                | (BookingStatus::Active, BookingStatus::Completed)
                | (BookingStatus::Extended, BookingStatus::Active)
                | (BookingStatus::Extended, BookingStatus::Extended)
                | (BookingStatus::Extended, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn ensure_transition(&self, next: BookingStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            return Ok(());
        }

        Err(DomainError::InvalidBookingTransition { from: self.status, to: next })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::domain::catalog::BikeId;
    use crate::errors::DomainError;

    use super::{Booking, BookingId, BookingStatus};

    fn booking(status: BookingStatus) -> Booking {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|date| date.and_hms_opt(10, 0, 0))
            .expect("valid fixture timestamp");
        Booking {
            id: BookingId("BK-1".to_string()),
            bike_id: BikeId("bk-7".to_string()),
            start,
            end: start + chrono::Duration::days(2),
            status,
            total: Decimal::new(1000, 0),
            coupon_code: None,
        }
    }

    #[test]
    fn confirmed_booking_can_be_cancelled() {
        let booking = booking(BookingStatus::Confirmed);
        booking.ensure_transition(BookingStatus::Cancelled).expect("confirmed -> cancelled");
    }

    #[test]
    fn active_booking_cannot_be_cancelled() {
        let booking = booking(BookingStatus::Active);
        let error =
            booking.ensure_transition(BookingStatus::Cancelled).expect_err("active -> cancelled");
        assert_eq!(
            error,
            DomainError::InvalidBookingTransition {
                from: BookingStatus::Active,
                to: BookingStatus::Cancelled,
            }
        );
    }

    #[test]
    fn only_running_bookings_can_be_extended() {
        assert!(!booking(BookingStatus::Pending).can_transition_to(BookingStatus::Extended));
        assert!(!booking(BookingStatus::Confirmed).can_transition_to(BookingStatus::Extended));
        assert!(booking(BookingStatus::Active).can_transition_to(BookingStatus::Extended));
        assert!(booking(BookingStatus::Extended).can_transition_to(BookingStatus::Extended));
        assert!(!booking(BookingStatus::Completed).can_transition_to(BookingStatus::Extended));
    }

    #[test]
    fn extended_booking_returns_to_active_or_completes() {
        let extended = booking(BookingStatus::Extended);
        assert!(extended.can_transition_to(BookingStatus::Active));
        assert!(extended.can_transition_to(BookingStatus::Completed));
        assert!(!extended.can_transition_to(BookingStatus::Cancelled));
    }
}
