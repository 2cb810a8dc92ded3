use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendBy {
    Hour,
    Day,
}

impl ExtendBy {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Hour => "hours",
            Self::Day => "days",
        }
    }
}

impl std::str::FromStr for ExtendBy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hour" | "hours" => Ok(Self::Hour),
            "day" | "days" => Ok(Self::Day),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported extension unit `{other}` (expected hour|day)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingExtensionRequest {
    pub extend_by: ExtendBy,
    /// Signed so that zero and negative input can be rejected rather than
    /// silently wrapped.
    pub amount: i64,
    pub current_end: NaiveDateTime,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingExtension {
    pub extend_by: ExtendBy,
    pub amount: u32,
    pub new_end: NaiveDateTime,
    pub extension_price: Decimal,
}
