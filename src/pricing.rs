//! Checkout price arithmetic. All amounts are minor units (pence).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::config;
use crate::errors::AppError;
use crate::models::{AppliedCoupon, DiscountType};

/// Price after applying `coupon`, never below zero.
pub fn compute_final_price(base_price: u64, coupon: Option<&AppliedCoupon>) -> u64 {
    let Some(coupon) = coupon else {
        return base_price;
    };

    match coupon.discount_type {
        DiscountType::Percentage => {
            let off = (base_price as u128 * coupon.discount_value as u128) / 100;
            (base_price as u128).saturating_sub(off) as u64
        }
        DiscountType::Fixed => base_price.saturating_sub(coupon.discount_value),
    }
}

pub fn discount_amount(base_price: u64, coupon: Option<&AppliedCoupon>) -> u64 {
    base_price - compute_final_price(base_price, coupon)
}

pub fn format_price(minor: u64) -> String {
    format_price_with(config::currency_symbol(), minor)
}

pub fn format_price_with(symbol: &str, minor: u64) -> String {
    format!("{}{}.{:02}", symbol, minor / 100, minor % 100)
}

/// "10% off" or "£1.00 off".
pub fn discount_label(coupon: &AppliedCoupon) -> String {
    match coupon.discount_type {
        DiscountType::Percentage => format!("{}% off", coupon.discount_value),
        DiscountType::Fixed => format!("{} off", format_price(coupon.discount_value)),
    }
}

/// Parse a decimal price such as "9.99" into pence. Half a penny rounds away
/// from zero.
pub fn try_parse_price_to_minor(input: &str) -> Result<u64, AppError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix(config::currency_symbol())
        .unwrap_or(trimmed)
        .trim();

    if trimmed.is_empty() {
        return Err(AppError::validation("Price must not be empty"));
    }

    let value = Decimal::from_str(trimmed)
        .map_err(|_| AppError::validation(format!("'{}' is not a valid price", input.trim())))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::validation("Price cannot be negative"));
    }

    (value * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| AppError::validation("Price is too large"))
}

/// Lenient variant used by admin forms: anything unparsable becomes 0.
pub fn parse_price_to_minor(input: &str) -> u64 {
    try_parse_price_to_minor(input).unwrap_or(0)
}
