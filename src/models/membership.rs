use serde::{Deserialize, Serialize};

use super::payment::PaymentMethod;

/// Ad-free membership. Whether it is active is derived from `expires_at`,
/// see `dashboard::membership::is_membership_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: u64,
    pub customer_username: String,
    /// Nanoseconds since the Unix epoch.
    pub purchased_at: i64,
    /// Nanoseconds since the Unix epoch.
    pub expires_at: i64,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseMembershipRequest {
    pub customer_username: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
}
