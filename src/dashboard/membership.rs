use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::audit::{self, PaymentAuditAction};
use crate::backend::StoreBackend;
use crate::errors::{AppError, AppResult};
use crate::models::{Membership, PaymentMethod};
use crate::session::Session;
use crate::{log_info, validation};

/// Current time in the backend's unit: milliseconds scaled to nanoseconds.
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_millis() * 1_000_000
}

/// A membership is active strictly before its expiry instant.
pub fn is_membership_active(membership: Option<&Membership>, now_ns: i64) -> bool {
    membership.is_some_and(|m| m.expires_at > now_ns)
}

/// What the dashboard and storefront show for a given membership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipGate {
    pub show_ads: bool,
    pub show_purchase: bool,
    pub show_active_status: bool,
}

impl MembershipGate {
    pub fn new(active: bool) -> Self {
        Self {
            show_ads: !active,
            show_purchase: !active,
            show_active_status: active,
        }
    }

    pub fn evaluate(membership: Option<&Membership>, now_ns: i64) -> Self {
        Self::new(is_membership_active(membership, now_ns))
    }
}

/// "05 Mar 2025", in UTC.
pub fn format_timestamp(ns: i64) -> String {
    DateTime::<Utc>::from_timestamp_nanos(ns)
        .format("%d %b %Y")
        .to_string()
}

/// Membership panel of the customer dashboard.
pub struct MembershipPanel {
    backend: Arc<dyn StoreBackend>,
}

impl MembershipPanel {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    pub async fn status(&self, username: &str) -> AppResult<Option<Membership>> {
        self.backend.get_membership_status(username).await
    }

    pub async fn gate(&self, username: &str) -> AppResult<MembershipGate> {
        let membership = self.status(username).await?;
        Ok(MembershipGate::evaluate(membership.as_ref(), now_nanos()))
    }

    /// Buy a membership for the logged-in customer. Returns the new id.
    pub async fn purchase(
        &self,
        session: &Session,
        method: Option<PaymentMethod>,
        reference: &str,
    ) -> AppResult<u64> {
        let method =
            method.ok_or_else(|| AppError::validation("Please select a payment method"))?;
        validation::validate_payment_reference(reference)?;
        let username = session.require_username()?;
        let reference = validation::sanitize_string(reference);

        let id = self
            .backend
            .purchase_membership(&username, method, &reference)
            .await?;

        audit::log_payment_action(
            PaymentAuditAction::PurchaseMembership,
            &json!({
                "membership_id": id,
                "customer": username,
                "payment_method": method.as_str(),
                "payment_reference": reference,
            }),
        );
        log_info!("MEMBERSHIP", "Membership purchased", json!({ "membership_id": id }));
        Ok(id)
    }
}

/// Convenience wrapper over [`MembershipPanel::purchase`].
pub async fn purchase_membership(
    session: &Session,
    method: Option<PaymentMethod>,
    reference: &str,
) -> AppResult<u64> {
    MembershipPanel::new(session.backend())
        .purchase(session, method, reference)
        .await
}
