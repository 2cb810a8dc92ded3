//! Contract with the remote rental REST API.
//!
//! The API is an opaque collaborator: this module only names the calls the
//! client makes and the typed values it expects back. Transport lives in the
//! `bikerent-client` crate.

pub mod envelope;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::booking::{Booking, BookingId};
use crate::domain::catalog::{Account, Bike, BikeId, Place, PlaceId};
use crate::domain::coupon::{Coupon, CouponCode};
use crate::domain::extension::ExtendBy;
use crate::domain::rental::PricingPeriod;
use crate::errors::ApplicationError;

pub use envelope::{ApiEnvelope, EnvelopeStatus};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request could not be delivered: {0}")]
    Transport(String),
    #[error("unexpected http status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("not signed in: {0}")]
    Unauthenticated(String),
}

impl From<ApiError> for ApplicationError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Unauthenticated(message) => Self::Session(message),
            other => Self::Api(other.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Clone, Debug)]
pub struct SessionGrant {
    pub token: SecretString,
    pub account: Account,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub bike_id: BikeId,
    pub pricing_period: PricingPeriod,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub coupon_code: Option<CouponCode>,
    pub total: Decimal,
    pub transaction_id: Option<String>,
    /// Reference to an identity document uploaded beforehand.
    pub document_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSubmission {
    pub booking_id: BookingId,
    pub extend_by: ExtendBy,
    pub amount: u32,
    pub new_end: NaiveDateTime,
    pub extension_price: Decimal,
    pub transaction_id: Option<String>,
}

#[async_trait]
pub trait RentalApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<SessionGrant, ApiError>;
    async fn profile(&self, token: &SecretString) -> Result<Account, ApiError>;
    async fn list_places(&self) -> Result<Vec<Place>, ApiError>;
    async fn list_bikes(&self, place_id: Option<&PlaceId>) -> Result<Vec<Bike>, ApiError>;
    async fn find_coupon(&self, code: &CouponCode) -> Result<Coupon, ApiError>;
    async fn list_bookings(&self, token: &SecretString) -> Result<Vec<Booking>, ApiError>;
    async fn create_booking(
        &self,
        token: &SecretString,
        booking: &NewBooking,
    ) -> Result<Booking, ApiError>;
    async fn extend_booking(
        &self,
        token: &SecretString,
        submission: &ExtensionSubmission,
    ) -> Result<Booking, ApiError>;
    async fn cancel_booking(
        &self,
        token: &SecretString,
        booking_id: &BookingId,
    ) -> Result<Booking, ApiError>;
}
