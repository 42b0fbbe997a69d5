use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::payment::PaymentMethod;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Declined,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Declined => "declined",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Declined => "Declined",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "declined" => Ok(OrderStatus::Declined),
            other => Err(AppError::validation(format!("Unknown order status '{other}'"))),
        }
    }
}

/// Customer order. `item_name` is the product or package name at purchase
/// time, not a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: u64,
    pub customer_username: String,
    pub item_name: String,
    pub price: u64,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub delivery_email: String,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Order {
    pub fn is_accepted(&self) -> bool {
        self.status == OrderStatus::Accepted
    }
}

/// Payload for `placeOrder`. `price` is the charged amount after any coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer_username: String,
    pub item_name: String,
    pub price: u64,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub coupon_code: Option<String>,
    pub delivery_email: String,
}

/// Item being bought in the current checkout (product or package).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub id: u64,
    pub name: String,
    pub price: u64,
    #[serde(default)]
    pub is_package: bool,
}

impl From<&super::product::Product> for CheckoutItem {
    fn from(p: &super::product::Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            is_package: false,
        }
    }
}

impl From<&super::product::Package> for CheckoutItem {
    fn from(p: &super::product::Package) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            is_package: true,
        }
    }
}
