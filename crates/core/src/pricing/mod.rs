pub mod calculator;

pub use calculator::{
    apply_coupon, compute_extension, compute_quote, derive_end_date, effective_daily_rate,
    rental_duration_days, validate_booking_window,
};

use crate::domain::extension::{BookingExtension, BookingExtensionRequest};
use crate::domain::rental::{RentalQuote, RentalQuoteRequest};
use crate::errors::ExtensionError;

pub trait QuoteCalculator: Send + Sync {
    fn quote(&self, request: &RentalQuoteRequest) -> RentalQuote;
    fn extension(
        &self,
        request: &BookingExtensionRequest,
    ) -> Result<BookingExtension, ExtensionError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicQuoteCalculator;

impl QuoteCalculator for DeterministicQuoteCalculator {
    fn quote(&self, request: &RentalQuoteRequest) -> RentalQuote {
        compute_quote(request)
    }

    fn extension(
        &self,
        request: &BookingExtensionRequest,
    ) -> Result<BookingExtension, ExtensionError> {
        compute_extension(request)
    }
}
