//! Coupon application for one checkout.
//!
//! States: `None -> Validating -> Applied | Error -> None`. Every `apply`
//! takes a generation ticket and `remove` advances the generation, so a
//! validation response that arrives after the customer moved on is dropped.

use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::StoreBackend;
use crate::errors::AppResult;
use crate::models::{AppliedCoupon, CheckoutItem, CouponValidation};
use crate::pricing;
use crate::validation;
use crate::{log_debug, log_warn};

pub const MSG_EMPTY_CODE: &str = "Please enter a coupon code";
pub const MSG_NOT_LOGGED_IN: &str = "Please log in to use coupons";
pub const MSG_INVALID: &str = "Invalid or expired coupon";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponState {
    None,
    Validating,
    Applied(AppliedCoupon),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponMessage {
    pub kind: MessageKind,
    pub text: String,
}

/// Proof that an `apply` was started. Hand it back to
/// [`CouponSession::complete_apply`] with the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyTicket {
    generation: u64,
    pub code: String,
    pub username: String,
}

#[derive(Debug)]
struct Inner {
    state: CouponState,
    input: String,
    message: Option<CouponMessage>,
    generation: u64,
}

impl Inner {
    fn fail(&mut self, text: &str) {
        self.state = CouponState::Error(text.to_string());
        self.message = Some(CouponMessage {
            kind: MessageKind::Error,
            text: text.to_string(),
        });
    }
}

pub struct CouponSession {
    backend: Arc<dyn StoreBackend>,
    inner: Mutex<Inner>,
}

impl CouponSession {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: CouponState::None,
                input: String::new(),
                message: None,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding this lock leaves plain data behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CouponState {
        self.lock().state.clone()
    }

    pub fn input(&self) -> String {
        self.lock().input.clone()
    }

    pub fn message(&self) -> Option<CouponMessage> {
        self.lock().message.clone()
    }

    pub fn applied(&self) -> Option<AppliedCoupon> {
        match &self.lock().state {
            CouponState::Applied(c) => Some(c.clone()),
            _ => None,
        }
    }

    pub fn is_validating(&self) -> bool {
        self.lock().state == CouponState::Validating
    }

    pub fn final_price(&self, item: &CheckoutItem) -> u64 {
        pricing::compute_final_price(item.price, self.applied().as_ref())
    }

    /// Mirror of the coupon input field: uppercased as typed, and typing
    /// clears a previous error.
    pub fn set_input(&self, text: &str) {
        let mut inner = self.lock();
        inner.input = text.to_uppercase();
        if matches!(inner.state, CouponState::Error(_)) {
            inner.state = CouponState::None;
            inner.message = None;
        }
    }

    /// Start applying `code`. Returns `None` when no backend call should be
    /// made: the code is empty, nobody is logged in, a coupon is already
    /// applied, or a validation is already in flight.
    pub fn begin_apply(&self, code: &str, username: Option<&str>) -> Option<ApplyTicket> {
        let mut inner = self.lock();

        match inner.state {
            CouponState::Applied(_) | CouponState::Validating => {
                log_debug!("COUPON", "Apply ignored while a coupon is applied or validating");
                return None;
            }
            CouponState::None | CouponState::Error(_) => {}
        }

        let code = validation::normalize_coupon_code(code);
        inner.input = code.clone();
        inner.generation += 1;

        if code.is_empty() {
            inner.fail(MSG_EMPTY_CODE);
            return None;
        }

        let username = match username.map(str::trim) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => {
                inner.fail(MSG_NOT_LOGGED_IN);
                return None;
            }
        };

        inner.state = CouponState::Validating;
        inner.message = None;

        Some(ApplyTicket {
            generation: inner.generation,
            code,
            username,
        })
    }

    /// Fold a validation response in. Returns `false` when the ticket is
    /// stale and the response was discarded.
    pub fn complete_apply(&self, ticket: ApplyTicket, result: AppResult<CouponValidation>) -> bool {
        let mut inner = self.lock();

        if inner.generation != ticket.generation || inner.state != CouponState::Validating {
            log_debug!(
                "COUPON",
                "Discarded stale coupon validation",
                json!({ "code": ticket.code })
            );
            return false;
        }

        let result = result.and_then(|validation| {
            let coupon = &validation.coupon;
            validation::validate_discount(coupon.discount_type, coupon.discount_value)?;
            Ok(validation)
        });

        match result {
            Ok(validation) => {
                let applied = AppliedCoupon::from(&validation.coupon);
                let text = format!(
                    "{} applied — {}",
                    applied.code,
                    pricing::discount_label(&applied)
                );
                inner.state = CouponState::Applied(applied);
                inner.message = Some(CouponMessage {
                    kind: MessageKind::Success,
                    text,
                });
            }
            Err(e) => {
                log_warn!(
                    "COUPON",
                    "Coupon rejected",
                    json!({ "code": ticket.code, "reason": e.to_string() })
                );
                inner.fail(MSG_INVALID);
            }
        }
        true
    }

    /// Apply `code` for `username` and return the resulting state.
    pub async fn apply(&self, code: &str, username: Option<&str>) -> CouponState {
        let Some(ticket) = self.begin_apply(code, username) else {
            return self.state();
        };

        let result = self
            .backend
            .validate_coupon(&ticket.code, &ticket.username)
            .await;
        self.complete_apply(ticket, result);
        self.state()
    }

    /// Drop any applied coupon, message and input. Also invalidates an
    /// in-flight validation.
    pub fn remove(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = CouponState::None;
        inner.input.clear();
        inner.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::errors::AppError;
    use crate::models::{Coupon, DiscountType};

    fn backend_with_save10() -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());
        backend
            .add_coupon(Coupon {
                code: "SAVE10".into(),
                discount_type: DiscountType::Percentage,
                discount_value: 10,
                used_count: 0,
                max_uses: 0,
                is_active: true,
            })
            .unwrap();
        backend
    }

    fn validation_for(code: &str) -> CouponValidation {
        CouponValidation {
            coupon: Coupon {
                code: code.into(),
                discount_type: DiscountType::Fixed,
                discount_value: 100,
                used_count: 0,
                max_uses: 0,
                is_active: true,
            },
            solo_use: false,
        }
    }

    #[tokio::test]
    async fn empty_code_fails_without_backend_call() {
        let backend = backend_with_save10();
        let session = CouponSession::new(backend.clone());

        let state = session.apply("   ", Some("alice")).await;
        assert_eq!(state, CouponState::Error(MSG_EMPTY_CODE.into()));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn logged_out_fails_without_backend_call() {
        let backend = backend_with_save10();
        let session = CouponSession::new(backend.clone());

        let state = session.apply("SAVE10", None).await;
        assert_eq!(state, CouponState::Error(MSG_NOT_LOGGED_IN.into()));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn apply_normalizes_and_succeeds() {
        let backend = backend_with_save10();
        let session = CouponSession::new(backend.clone());

        let state = session.apply(" save10 ", Some("alice")).await;
        assert_eq!(state, CouponState::Applied(AppliedCoupon::percentage("SAVE10", 10)));
        assert_eq!(session.input(), "SAVE10");
        let message = session.message().unwrap();
        assert_eq!(message.kind, MessageKind::Success);
        assert_eq!(message.text, "SAVE10 applied — 10% off");

        let item = CheckoutItem { id: 1, name: "Lua Pack".into(), price: 1000, is_package: false };
        assert_eq!(session.final_price(&item), 900);
    }

    #[tokio::test]
    async fn rejection_shows_generic_message() {
        let session = CouponSession::new(backend_with_save10());
        let state = session.apply("BOGUS", Some("alice")).await;
        assert_eq!(state, CouponState::Error(MSG_INVALID.into()));
    }

    #[tokio::test]
    async fn apply_while_applied_is_rejected() {
        let backend = backend_with_save10();
        let session = CouponSession::new(backend.clone());
        session.apply("SAVE10", Some("alice")).await;

        let state = session.apply("OTHER", Some("alice")).await;
        assert!(matches!(state, CouponState::Applied(ref c) if c.code == "SAVE10"));
        assert_eq!(backend.call_count("validate_coupon"), 1);
    }

    #[test]
    fn remove_resets_everything() {
        let session = CouponSession::new(backend_with_save10());
        let ticket = session.begin_apply("FIXED", Some("alice")).unwrap();
        assert!(session.complete_apply(ticket, Ok(validation_for("FIXED"))));
        assert!(session.applied().is_some());

        session.remove();
        assert_eq!(session.state(), CouponState::None);
        assert_eq!(session.input(), "");
        assert!(session.message().is_none());
        assert!(session.applied().is_none());
    }

    #[test]
    fn second_apply_while_validating_is_rejected() {
        let session = CouponSession::new(backend_with_save10());
        let first = session.begin_apply("FIXED", Some("alice")).unwrap();
        assert!(session.begin_apply("OTHER", Some("alice")).is_none());
        assert!(session.is_validating());
        assert!(session.complete_apply(first, Ok(validation_for("FIXED"))));
    }

    #[test]
    fn response_after_remove_is_discarded() {
        let session = CouponSession::new(backend_with_save10());
        let ticket = session.begin_apply("FIXED", Some("alice")).unwrap();
        session.remove();

        assert!(!session.complete_apply(ticket, Ok(validation_for("FIXED"))));
        assert_eq!(session.state(), CouponState::None);
        assert!(session.applied().is_none());
    }

    #[test]
    fn stale_ticket_cannot_overwrite_newer_apply() {
        let session = CouponSession::new(backend_with_save10());
        let old = session.begin_apply("OLD", Some("alice")).unwrap();
        session.remove();
        let new = session.begin_apply("NEW", Some("alice")).unwrap();

        assert!(!session.complete_apply(old, Err(AppError::backend("Coupon not found"))));
        assert!(session.is_validating());
        assert!(session.complete_apply(new, Ok(validation_for("NEW"))));
        assert_eq!(session.applied().unwrap().code, "NEW");
    }

    #[test]
    fn out_of_range_percentage_is_treated_as_invalid() {
        let session = CouponSession::new(backend_with_save10());
        let ticket = session.begin_apply("HUGE", Some("alice")).unwrap();
        let mut validation = validation_for("HUGE");
        validation.coupon.discount_type = DiscountType::Percentage;
        validation.coupon.discount_value = 150;

        assert!(session.complete_apply(ticket, Ok(validation)));
        assert_eq!(session.state(), CouponState::Error(MSG_INVALID.into()));
        assert!(session.applied().is_none());

        let item = CheckoutItem { id: 1, name: "Lua Pack".into(), price: 1000, is_package: false };
        assert_eq!(session.final_price(&item), 1000);
    }

    #[test]
    fn typing_clears_error() {
        let session = CouponSession::new(backend_with_save10());
        assert!(session.begin_apply("", Some("alice")).is_none());
        assert!(matches!(session.state(), CouponState::Error(_)));

        session.set_input("save");
        assert_eq!(session.state(), CouponState::None);
        assert_eq!(session.input(), "SAVE");
        assert!(session.message().is_none());
    }
}
