use serde_json::json;
use std::sync::Arc;

use super::coupon::CouponSession;
use crate::audit::{self, PaymentAuditAction};
use crate::backend::StoreBackend;
use crate::errors::{AppError, AppResult};
use crate::models::{CheckoutItem, PaymentMethod, PaymentSettings, PlaceOrderRequest};
use crate::pricing;
use crate::session::Session;
use crate::{log_error, log_info, log_warn, validation};

/// What the customer filled in on the checkout form.
#[derive(Debug, Clone, Default)]
pub struct OrderForm {
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: String,
    pub delivery_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: u64,
    pub charged_price: u64,
    pub coupon_code: Option<String>,
    /// Whether the delivery email was saved to the customer's profile.
    pub email_synced: bool,
}

/// Price lines shown above the order button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSummary {
    pub original: u64,
    pub discount: u64,
    pub total: u64,
}

/// One checkout: the item being bought and its coupon state.
pub struct Checkout {
    item: CheckoutItem,
    coupon: CouponSession,
    backend: Arc<dyn StoreBackend>,
}

impl Checkout {
    pub fn new(item: CheckoutItem, backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            item,
            coupon: CouponSession::new(Arc::clone(&backend)),
            backend,
        }
    }

    pub fn item(&self) -> &CheckoutItem {
        &self.item
    }

    pub fn coupon(&self) -> &CouponSession {
        &self.coupon
    }

    pub fn final_price(&self) -> u64 {
        self.coupon.final_price(&self.item)
    }

    pub fn summary(&self) -> PriceSummary {
        let applied = self.coupon.applied();
        PriceSummary {
            original: self.item.price,
            discount: pricing::discount_amount(self.item.price, applied.as_ref()),
            total: pricing::compute_final_price(self.item.price, applied.as_ref()),
        }
    }

    /// Payment destinations, or `None` when they could not be loaded.
    pub async fn payment_settings(&self) -> Option<PaymentSettings> {
        match self.backend.get_payment_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                log_warn!(
                    "CHECKOUT",
                    "Failed to load payment settings",
                    json!({ "reason": e.to_string() })
                );
                None
            }
        }
    }

    /// Place the order at the discounted price. The delivery email is saved
    /// to the profile afterwards when it changed; that step never fails the
    /// order.
    pub async fn place_order(&self, session: &Session, form: &OrderForm) -> AppResult<PlacedOrder> {
        let payment_method = form
            .payment_method
            .ok_or_else(|| AppError::validation("Please select a payment method"))?;
        validation::validate_payment_reference(&form.payment_reference)?;
        if form.delivery_email.trim().is_empty() {
            return Err(AppError::validation("Please enter a delivery email"));
        }
        let username = session.require_username()?;

        let applied = self.coupon.applied();
        let charged_price = pricing::compute_final_price(self.item.price, applied.as_ref());
        let request = PlaceOrderRequest {
            customer_username: username,
            item_name: self.item.name.clone(),
            price: charged_price,
            payment_method,
            payment_reference: validation::sanitize_string(&form.payment_reference),
            coupon_code: applied.map(|c| c.code),
            delivery_email: form.delivery_email.trim().to_string(),
        };

        let order_id = self.backend.place_order(&request).await?;

        audit::log_payment_action(
            PaymentAuditAction::PlaceOrder,
            &json!({
                "order_id": order_id,
                "item_name": request.item_name,
                "price": charged_price,
                "payment_method": payment_method.as_str(),
                "payment_reference": request.payment_reference,
                "coupon_code": request.coupon_code,
            }),
        );

        let email_synced = match session.sync_email(&request.delivery_email).await {
            Ok(saved) => saved,
            Err(e) => {
                log_error!("CHECKOUT", "Failed to save email to profile", e);
                false
            }
        };

        log_info!(
            "CHECKOUT",
            "Order placed",
            json!({ "order_id": order_id, "price": charged_price })
        );

        Ok(PlacedOrder {
            order_id,
            charged_price,
            coupon_code: request.coupon_code,
            email_synced,
        })
    }
}
