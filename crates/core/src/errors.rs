use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::domain::booking::BookingStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BookingWindowError {
    #[error("booking cannot start in the past (start {start}, now {now})")]
    PastStart { start: NaiveDateTime, now: NaiveDateTime },
    #[error("booking must end after it starts (start {start}, end {end})")]
    InvertedRange { start: NaiveDateTime, end: NaiveDateTime },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("coupon `{code}` is not active")]
    Inactive { code: String },
    #[error("coupon `{code}` expired on {expiry_date}")]
    Expired { code: String, expiry_date: NaiveDate },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("extension amount must be a positive whole number, got {amount}")]
    InvalidAmount { amount: i64 },
    #[error("extension of {amount} {unit} exceeds the limit of {limit} {unit}")]
    AboveLimit { amount: i64, unit: &'static str, limit: u32 },
    #[error("extension price for {amount} units is out of range")]
    PriceOutOfRange { amount: i64 },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    BookingWindow(#[from] BookingWindowError),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error(transparent)]
    Extension(#[from] ExtensionError),
    #[error("invalid booking transition from {from:?} to {to:?}")]
    InvalidBookingTransition { from: BookingStatus, to: BookingStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("rental api failure: {0}")]
    Api(String),
    #[error("payment failure: {0}")]
    Payment(String),
    #[error("session failure: {0}")]
    Session(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<BookingWindowError> for ApplicationError {
    fn from(value: BookingWindowError) -> Self {
        Self::Domain(value.into())
    }
}

impl From<ExtensionError> for ApplicationError {
    fn from(value: ExtensionError) -> Self {
        Self::Domain(value.into())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Unauthorized { .. } => "Please sign in and try again.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthorized { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthorized { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Session(message) => {
                Self::Unauthorized { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Api(message) | ApplicationError::Payment(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
