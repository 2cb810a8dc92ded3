use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::coupon::{Coupon, CouponCode};
use crate::errors::DomainError;
use crate::pricing::derive_end_date;

/// Billing granularity selected for a rental.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPeriod {
    Day,
    Week,
    Month,
}

impl PricingPeriod {
    /// Fixed rental span implied by the period. Daily rentals have none: the
    /// customer picks the end date.
    pub fn span_days(self) -> Option<u64> {
        match self {
            Self::Day => None,
            Self::Week => Some(7),
            Self::Month => Some(30),
        }
    }
}

impl std::str::FromStr for PricingPeriod {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported pricing period `{other}` (expected day|week|month)"
            ))),
        }
    }
}

/// Largest accepted value for any single rate. Keeps every subtotal well
/// inside `Decimal` range for the longest rental a quote can describe.
pub const MAX_RATE: u64 = 1_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalRates {
    pub per_day: Decimal,
    #[serde(default)]
    pub per_week: Option<Decimal>,
    #[serde(default)]
    pub per_month: Option<Decimal>,
}

impl RentalRates {
    pub fn daily(per_day: Decimal) -> Self {
        Self { per_day, per_week: None, per_month: None }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let rates = [
            ("perDay", Some(self.per_day)),
            ("perWeek", self.per_week),
            ("perMonth", self.per_month),
        ];
        for (name, rate) in rates {
            let Some(value) = rate else {
                continue;
            };
            if value < Decimal::ZERO {
                return Err(DomainError::InvariantViolation(format!(
                    "rate {name} must not be negative"
                )));
            }
            if value > Decimal::from(MAX_RATE) {
                return Err(DomainError::InvariantViolation(format!(
                    "rate {name} must not exceed {MAX_RATE}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything the quote calculator needs, rebuilt from user input on every change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalQuoteRequest {
    pub pricing_period: PricingPeriod,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub rates: RentalRates,
    pub coupon: Option<Coupon>,
    /// Day against which coupon expiry is judged.
    pub quoted_on: NaiveDate,
}

impl RentalQuoteRequest {
    pub fn new(pricing_period: PricingPeriod, rates: RentalRates, quoted_on: NaiveDate) -> Self {
        Self { pricing_period, start: None, end: None, rates, coupon: None, quoted_on }
    }

    /// Sets the start and, for weekly and monthly rentals, the derived end.
    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        if let Some(end) = derive_end_date(start, self.pricing_period) {
            self.end = Some(end);
        }
        self
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Switches the pricing period. A chosen start re-derives the end for
    /// weekly and monthly periods; a daily period keeps whatever end was entered.
    pub fn with_period(mut self, pricing_period: PricingPeriod) -> Self {
        self.pricing_period = pricing_period;
        if let Some(end) = self.start.and_then(|start| derive_end_date(start, pricing_period)) {
            self.end = Some(end);
        }
        self
    }

    pub fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.coupon = Some(coupon);
        self
    }
}

/// Derived price and duration estimate. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalQuote {
    pub duration_days: u32,
    pub effective_daily_rate: Decimal,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<CouponCode>,
}

impl RentalQuote {
    /// Quote for a request whose dates are not both chosen yet.
    pub fn incomplete() -> Self {
        Self {
            duration_days: 0,
            effective_daily_rate: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            coupon_code: None,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.duration_days > 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use super::{PricingPeriod, RentalQuoteRequest, RentalRates, MAX_RATE};

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").expect("valid fixture timestamp")
    }

    fn draft(period: PricingPeriod) -> RentalQuoteRequest {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid fixture date");
        RentalQuoteRequest::new(period, RentalRates::daily(Decimal::new(100, 0)), today)
    }

    #[test]
    fn weekly_start_derives_end_date() {
        let request = draft(PricingPeriod::Week).with_start(at("2025-01-01 09:00"));

        assert_eq!(request.end, Some(at("2025-01-08 09:00")));
    }

    #[test]
    fn switching_to_month_recomputes_end() {
        let request = draft(PricingPeriod::Day)
            .with_start(at("2025-01-01 09:00"))
            .with_end(at("2025-01-03 09:00"))
            .with_period(PricingPeriod::Month);

        assert_eq!(request.end, Some(at("2025-01-31 09:00")));
    }

    #[test]
    fn switching_to_day_keeps_entered_end() {
        let request = draft(PricingPeriod::Week)
            .with_start(at("2025-01-01 09:00"))
            .with_end(at("2025-01-05 18:00"))
            .with_period(PricingPeriod::Day);

        assert_eq!(request.end, Some(at("2025-01-05 18:00")));
    }

    #[test]
    fn negative_rates_are_rejected() {
        let rates = RentalRates {
            per_day: Decimal::new(100, 0),
            per_week: Some(Decimal::new(-1, 0)),
            per_month: None,
        };
        let error = rates.validate().expect_err("negative weekly rate should fail");
        assert!(error.to_string().contains("perWeek"));
    }

    #[test]
    fn oversized_rates_are_rejected() {
        let rates = RentalRates {
            per_day: Decimal::new(100, 0),
            per_week: None,
            per_month: Some(Decimal::MAX),
        };
        let error = rates.validate().expect_err("unbounded monthly rate should fail");
        assert!(error.to_string().contains("perMonth"));
        assert!(RentalRates::daily(Decimal::from(MAX_RATE)).validate().is_ok());
    }

    #[test]
    fn pricing_period_parses_aliases() {
        assert_eq!("Weekly".parse::<PricingPeriod>().ok(), Some(PricingPeriod::Week));
        assert_eq!("month".parse::<PricingPeriod>().ok(), Some(PricingPeriod::Month));
        assert!("fortnight".parse::<PricingPeriod>().is_err());
    }
}
