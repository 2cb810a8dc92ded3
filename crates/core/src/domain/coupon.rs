use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CouponError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CouponCode(pub String);

impl std::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: CouponCode,
    /// Percentage of the pre-discount subtotal, 0 to 100.
    pub discount_percent: Decimal,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Coupon {
    pub fn percent_off(code: impl Into<String>, discount_percent: Decimal) -> Self {
        Self { code: CouponCode(code.into()), discount_percent, expiry_date: None, is_active: true }
    }

    pub fn expiring(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Date-only comparison; a coupon is still valid on its expiry date.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }

    pub fn ensure_usable_on(&self, today: NaiveDate) -> Result<(), CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive { code: self.code.0.clone() });
        }
        match self.expiry_date {
            Some(expiry_date) if self.is_expired_on(today) => {
                Err(CouponError::Expired { code: self.code.0.clone(), expiry_date })
            }
            _ => Ok(()),
        }
    }
}
