use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(AppError::validation(format!(
                "Unknown discount type '{other}'"
            ))),
        }
    }
}

/// Coupon record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent (1-100) or pence, depending on `discount_type`.
    pub discount_value: u64,
    pub used_count: u64,
    /// 0 means unlimited.
    pub max_uses: u64,
    pub is_active: bool,
}

impl Coupon {
    pub fn is_exhausted(&self) -> bool {
        self.max_uses != 0 && self.used_count >= self.max_uses
    }
}

/// Result of a successful `validateCoupon` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub coupon: Coupon,
    pub solo_use: bool,
}

/// The part of a coupon the checkout keeps once it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: u64,
}

impl AppliedCoupon {
    pub fn percentage(code: &str, percent: u64) -> Self {
        Self {
            code: code.to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: percent,
        }
    }

    pub fn fixed(code: &str, pence: u64) -> Self {
        Self {
            code: code.to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: pence,
        }
    }
}

impl From<&Coupon> for AppliedCoupon {
    fn from(c: &Coupon) -> Self {
        Self {
            code: c.code.clone(),
            discount_type: c.discount_type,
            discount_value: c.discount_value,
        }
    }
}

/// Admin payload for creating or updating a coupon. Checked by
/// `validation::validate_coupon_draft` before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDraft {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: u64,
    pub max_uses: u64,
    pub is_active: bool,
}
