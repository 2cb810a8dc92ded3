use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ApplicationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Caller-chosen reference echoed back by the gateway.
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment declined: {reason}")]
    Declined { reason: String },
    #[error("payment cancelled by the customer")]
    Cancelled,
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

impl From<PaymentError> for ApplicationError {
    fn from(value: PaymentError) -> Self {
        Self::Payment(value.to_string())
    }
}

/// Hosted checkout, modelled as one awaited call instead of widget callbacks.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn checkout(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}
