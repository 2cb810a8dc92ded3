//! Booking quote calculator.
//!
//! Pure functions only: no clock, no storage, no network. Callers pass `now`
//! and `today` explicitly so every result is reproducible.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::coupon::Coupon;
use crate::domain::extension::{BookingExtension, BookingExtensionRequest, ExtendBy};
use crate::domain::rental::{PricingPeriod, RentalQuote, RentalQuoteRequest, RentalRates};
use crate::errors::{BookingWindowError, CouponError, ExtensionError};

const MILLIS_PER_DAY: u64 = 86_400_000;

/// End of a fixed-span rental, or `None` for daily rentals where the
/// customer's own end date must be left untouched.
pub fn derive_end_date(start: NaiveDateTime, period: PricingPeriod) -> Option<NaiveDateTime> {
    period.span_days().and_then(|days| start.checked_add_days(Days::new(days)))
}

pub fn effective_daily_rate(period: PricingPeriod, rates: &RentalRates) -> Decimal {
    let scaled = match period {
        PricingPeriod::Day => None,
        PricingPeriod::Week => rates.per_week.map(|per_week| per_week / Decimal::from(7)),
        PricingPeriod::Month => rates.per_month.map(|per_month| per_month / Decimal::from(30)),
    };
    scaled.unwrap_or(rates.per_day)
}

/// Whole calendar days between two instants, rounded up. Uses the absolute
/// difference; ordering is checked by [`validate_booking_window`].
pub fn rental_duration_days(start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    let elapsed_ms = (end - start).num_milliseconds().unsigned_abs();
    u32::try_from(elapsed_ms.div_ceil(MILLIS_PER_DAY)).unwrap_or(u32::MAX)
}

/// Prices a request. Missing dates give an incomplete quote rather than an
/// error, and so does a subtotal too large to represent; rates accepted by
/// [`RentalRates::validate`] never reach that case.
pub fn compute_quote(request: &RentalQuoteRequest) -> RentalQuote {
    let (Some(start), Some(end)) = (request.start, request.end) else {
        return RentalQuote::incomplete();
    };

    let duration_days = rental_duration_days(start, end);
    let effective_daily_rate = effective_daily_rate(request.pricing_period, &request.rates);
    let Some(subtotal) = Decimal::from(duration_days).checked_mul(effective_daily_rate) else {
        return RentalQuote::incomplete();
    };

    let applied = match &request.coupon {
        Some(coupon) if duration_days > 0 => apply_coupon(coupon, subtotal, request.quoted_on)
            .ok()
            .map(|discount| (coupon.code.clone(), discount)),
        _ => None,
    };
    let (coupon_code, discount_amount) = match applied {
        Some((code, discount)) => (Some(code), discount),
        None => (None, Decimal::ZERO),
    };

    RentalQuote {
        duration_days,
        effective_daily_rate,
        subtotal,
        discount_amount,
        total: (subtotal - discount_amount).max(Decimal::ZERO),
        coupon_code,
    }
}

pub fn validate_booking_window(
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<(), BookingWindowError> {
    if start < now {
        return Err(BookingWindowError::PastStart { start, now });
    }
    if start >= end {
        return Err(BookingWindowError::InvertedRange { start, end });
    }
    Ok(())
}

/// Discount granted by `coupon` on `subtotal`. Always a share of the
/// pre-discount subtotal and never more than it.
pub fn apply_coupon(
    coupon: &Coupon,
    subtotal: Decimal,
    today: NaiveDate,
) -> Result<Decimal, CouponError> {
    coupon.ensure_usable_on(today)?;

    let hundred = Decimal::ONE_HUNDRED;
    let percent = coupon.discount_percent.clamp(Decimal::ZERO, hundred);
    // Dividing first cannot overflow and still yields at most the subtotal.
    let discount = subtotal
        .checked_mul(percent)
        .map_or_else(|| subtotal / hundred * percent, |scaled| scaled / hundred);
    Ok(discount.min(subtotal.max(Decimal::ZERO)))
}

pub fn compute_extension(
    request: &BookingExtensionRequest,
) -> Result<BookingExtension, ExtensionError> {
    let invalid = ExtensionError::InvalidAmount { amount: request.amount };
    let amount = u32::try_from(request.amount).ok().filter(|amount| *amount > 0).ok_or(invalid)?;

    let (step, rate) = match request.extend_by {
        ExtendBy::Hour => (Duration::try_hours(i64::from(amount)), request.hourly_rate),
        ExtendBy::Day => (Duration::try_days(i64::from(amount)), request.daily_rate),
    };
    let new_end = step
        .and_then(|step| request.current_end.checked_add_signed(step))
        .ok_or(ExtensionError::InvalidAmount { amount: request.amount })?;

    let extension_price = Decimal::from(amount)
        .checked_mul(rate)
        .ok_or(ExtensionError::PriceOutOfRange { amount: request.amount })?;

    Ok(BookingExtension { extend_by: request.extend_by, amount, new_end, extension_price })
}
