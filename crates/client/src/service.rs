//! Booking orchestration.
//!
//! [`BookingService`] strings the pure quote calculator together with the
//! remote API, the payment gateway and the session store. Every remote or
//! payment failure is surfaced to the caller as-is; nothing is retried.

use bikerent_core::api::{ApiError, Credentials, ExtensionSubmission, NewBooking, RentalApi};
use bikerent_core::config::BookingConfig;
use bikerent_core::domain::booking::{Booking, BookingStatus};
use bikerent_core::domain::catalog::{Account, Bike, BikeId, Place, PlaceId};
use bikerent_core::domain::coupon::CouponCode;
use bikerent_core::domain::extension::{BookingExtension, BookingExtensionRequest, ExtendBy};
use bikerent_core::domain::rental::{RentalQuote, RentalQuoteRequest};
use bikerent_core::errors::{ApplicationError, CouponError, DomainError};
use bikerent_core::payment::{PaymentGateway, PaymentReceipt, PaymentRequest};
use bikerent_core::pricing::{
    validate_booking_window, DeterministicQuoteCalculator, QuoteCalculator,
};
use bikerent_core::session::SessionStore;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingSettings {
    pub limits: BookingConfig,
    pub currency: String,
}

/// Why a requested coupon did not end up on the quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouponIssue {
    Invalid(CouponError),
    Lookup(ApiError),
}

impl std::fmt::Display for CouponIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(error) => write!(f, "{error}"),
            Self::Lookup(error) => write!(f, "coupon lookup failed: {error}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteOutcome {
    pub quote: RentalQuote,
    pub coupon_issue: Option<CouponIssue>,
}

/// A submitted booking together with any coupon the customer asked for that
/// did not apply. The booking was charged without that discount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedBooking {
    pub booking: Booking,
    pub coupon_issue: Option<CouponIssue>,
}

/// A booking the customer is about to submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingDraft {
    pub bike_id: BikeId,
    pub request: RentalQuoteRequest,
    pub coupon_code: Option<CouponCode>,
    pub document_ref: Option<String>,
}

pub struct BookingService<A, P, S, C = DeterministicQuoteCalculator> {
    api: A,
    payments: P,
    sessions: S,
    calculator: C,
    settings: BookingSettings,
}

impl<A, P, S, C> BookingService<A, P, S, C>
where
    A: RentalApi,
    P: PaymentGateway,
    S: SessionStore,
    C: QuoteCalculator,
{
    pub fn new(
        api: A,
        payments: P,
        sessions: S,
        calculator: C,
        settings: BookingSettings,
    ) -> Self {
        Self { api, payments, sessions, calculator, settings }
    }

    pub fn settings(&self) -> &BookingSettings {
        &self.settings
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Account, ApplicationError> {
        let grant = self.api.login(credentials).await?;
        self.sessions.set(grant.token)?;

        info!(
            event_name = "bikerent.session.signed_in",
            account_id = %grant.account.id.0,
            "signed in"
        );
        Ok(grant.account)
    }

    pub fn logout(&self) -> Result<(), ApplicationError> {
        self.sessions.clear()?;
        info!(event_name = "bikerent.session.signed_out", "signed out");
        Ok(())
    }

    pub async fn profile(&self) -> Result<Account, ApplicationError> {
        let token = self.session_token()?;
        Ok(self.api.profile(&token).await?)
    }

    pub async fn places(&self) -> Result<Vec<Place>, ApplicationError> {
        Ok(self.api.list_places().await?)
    }

    pub async fn bikes(&self, place_id: Option<&PlaceId>) -> Result<Vec<Bike>, ApplicationError> {
        Ok(self.api.list_bikes(place_id).await?)
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>, ApplicationError> {
        let token = self.session_token()?;
        Ok(self.api.list_bookings(&token).await?)
    }

    /// Prices a draft, resolving `coupon_code` through the API first.
    ///
    /// A coupon that cannot be found or applied never blocks the quote; the
    /// problem comes back in [`QuoteOutcome::coupon_issue`] and the quote is
    /// priced without a discount.
    pub async fn quote(
        &self,
        request: &RentalQuoteRequest,
        coupon_code: Option<&CouponCode>,
    ) -> QuoteOutcome {
        let mut request = request.clone();
        let mut coupon_issue = None;

        if let Some(code) = coupon_code {
            match self.api.find_coupon(code).await {
                Ok(coupon) => match coupon.ensure_usable_on(request.quoted_on) {
                    Ok(()) => request = request.with_coupon(coupon),
                    Err(error) => coupon_issue = Some(CouponIssue::Invalid(error)),
                },
                Err(error) => coupon_issue = Some(CouponIssue::Lookup(error)),
            }
        }

        if let Some(issue) = &coupon_issue {
            warn!(
                event_name = "bikerent.quote.coupon_rejected",
                issue = %issue,
                "coupon not applied to quote"
            );
        }

        QuoteOutcome { quote: self.calculator.quote(&request), coupon_issue }
    }

    /// Validates, charges and submits a booking. A zero total skips the
    /// payment step. A requested coupon that could not be applied does not
    /// stop the booking; it is returned in [`SubmittedBooking::coupon_issue`].
    pub async fn book(
        &self,
        draft: &BookingDraft,
        now: NaiveDateTime,
    ) -> Result<SubmittedBooking, ApplicationError> {
        let token = self.session_token()?;
        let (Some(start), Some(end)) = (draft.request.start, draft.request.end) else {
            return Err(DomainError::InvariantViolation(
                "booking needs both a start and an end".to_string(),
            )
            .into());
        };
        validate_booking_window(start, end, now)?;

        let QuoteOutcome { quote, coupon_issue } =
            self.quote(&draft.request, draft.coupon_code.as_ref()).await;
        if !quote.is_bookable() {
            return Err(DomainError::InvariantViolation(
                "booking must last at least one day".to_string(),
            )
            .into());
        }

        let correlation_id = Uuid::new_v4().to_string();
        let description = format!("Bike {} for {} day(s)", draft.bike_id.0, quote.duration_days);
        let receipt = self.charge(&correlation_id, quote.total, description).await?;

        let booking = self
            .api
            .create_booking(
                &token,
                &NewBooking {
                    bike_id: draft.bike_id.clone(),
                    pricing_period: draft.request.pricing_period,
                    start,
                    end,
                    coupon_code: quote.coupon_code.clone(),
                    total: quote.total,
                    transaction_id: receipt.map(|receipt| receipt.transaction_id),
                    document_ref: draft.document_ref.clone(),
                },
            )
            .await?;

        info!(
            event_name = "bikerent.booking.submitted",
            correlation_id = %correlation_id,
            booking_id = %booking.id,
            total = %quote.total,
            "booking submitted"
        );
        Ok(SubmittedBooking { booking, coupon_issue })
    }

    /// Prices an extension without submitting it, applying the configured
    /// upper bound on the amount.
    pub fn price_extension(
        &self,
        booking: &Booking,
        bike: &Bike,
        extend_by: ExtendBy,
        amount: i64,
    ) -> Result<BookingExtension, ApplicationError> {
        self.settings.limits.ensure_extension_within(extend_by, amount)?;
        let extension = self.calculator.extension(&BookingExtensionRequest {
            extend_by,
            amount,
            current_end: booking.end,
            hourly_rate: bike.hourly_rate,
            daily_rate: bike.rates.per_day,
        })?;
        Ok(extension)
    }

    pub async fn extend(
        &self,
        booking: &Booking,
        bike: &Bike,
        extend_by: ExtendBy,
        amount: i64,
    ) -> Result<Booking, ApplicationError> {
        let token = self.session_token()?;
        booking.ensure_transition(BookingStatus::Extended)?;
        let extension = self.price_extension(booking, bike, extend_by, amount)?;

        let correlation_id = Uuid::new_v4().to_string();
        let description =
            format!("Extend booking {} by {} {}", booking.id, extension.amount, extend_by.unit());
        let receipt = self.charge(&correlation_id, extension.extension_price, description).await?;

        let updated = self
            .api
            .extend_booking(
                &token,
                &ExtensionSubmission {
                    booking_id: booking.id.clone(),
                    extend_by,
                    amount: extension.amount,
                    new_end: extension.new_end,
                    extension_price: extension.extension_price,
                    transaction_id: receipt.map(|receipt| receipt.transaction_id),
                },
            )
            .await?;

        info!(
            event_name = "bikerent.booking.extended",
            correlation_id = %correlation_id,
            booking_id = %updated.id,
            new_end = %extension.new_end,
            "booking extended"
        );
        Ok(updated)
    }

    pub async fn cancel(&self, booking: &Booking) -> Result<Booking, ApplicationError> {
        booking.ensure_transition(BookingStatus::Cancelled)?;
        let token = self.session_token()?;
        let cancelled = self.api.cancel_booking(&token, &booking.id).await?;

        info!(
            event_name = "bikerent.booking.cancelled",
            booking_id = %cancelled.id,
            "booking cancelled"
        );
        Ok(cancelled)
    }

    fn session_token(&self) -> Result<SecretString, ApplicationError> {
        self.sessions
            .get()?
            .ok_or_else(|| ApplicationError::Session("sign in to continue".to_string()))
    }

    async fn charge(
        &self,
        reference: &str,
        amount: Decimal,
        description: String,
    ) -> Result<Option<PaymentReceipt>, ApplicationError> {
        if amount <= Decimal::ZERO {
            return Ok(None);
        }

        let request = PaymentRequest {
            reference: reference.to_string(),
            amount,
            currency: self.settings.currency.clone(),
            description,
        };
        let receipt = self.payments.checkout(request).await.map_err(|error| {
            warn!(
                event_name = "bikerent.payment.failed",
                correlation_id = %reference,
                error = %error,
                "payment did not complete"
            );
            ApplicationError::from(error)
        })?;

        info!(
            event_name = "bikerent.payment.captured",
            correlation_id = %reference,
            transaction_id = %receipt.transaction_id,
            amount = %receipt.amount,
            "payment captured"
        );
        Ok(Some(receipt))
    }
}
