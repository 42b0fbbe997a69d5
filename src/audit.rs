use crate::errors::AppError;
use crate::{log_error, log_payment};

/// Audit actions for customer payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAuditAction {
    PlaceOrder,
    PurchaseMembership,
    ApplyCoupon,
    DownloadFile,
}

impl PaymentAuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAuditAction::PlaceOrder => "ORDER_PLACE",
            PaymentAuditAction::PurchaseMembership => "MEMBERSHIP_PURCHASE",
            PaymentAuditAction::ApplyCoupon => "COUPON_APPLY",
            PaymentAuditAction::DownloadFile => "FILE_DOWNLOAD",
        }
    }
}

/// Record a payment-related action. Payment references in `metadata` are
/// redacted by the logger.
pub fn log_payment_action(action: PaymentAuditAction, metadata: &serde_json::Value) {
    log_payment!(action.as_str(), metadata);
}

/// Map an error to a message fit for a toast, logging the full error.
pub fn user_message(err: &AppError, context: &str) -> String {
    log_error!("AUDIT", context, err);

    match err {
        AppError::Validation(msg) => msg.clone(),
        AppError::NotLoggedIn => err.to_string(),
        AppError::Transport(_) => {
            "Could not reach the store. Check your connection and try again.".to_string()
        }
        AppError::Decode(_) => "The store sent an unexpected response. Please try again.".to_string(),
        AppError::NotFound(_) => "That item could not be found.".to_string(),
        AppError::Io(_) => "Could not save the file to disk.".to_string(),
        AppError::Backend { message, .. } => backend_message(message, context),
    }
}

fn backend_message(raw: &str, context: &str) -> String {
    let lower = raw.to_lowercase();

    if lower.contains("already taken") {
        return "That username is already taken. Please choose another.".to_string();
    }

    if lower.contains("unauthorized") || lower.contains("not registered") {
        return "Please log in to continue.".to_string();
    }

    if lower.contains("coupon") {
        return "Invalid or expired coupon".to_string();
    }

    if lower.contains("timeout") || lower.contains("connection") {
        return "Could not reach the store. Check your connection and try again.".to_string();
    }

    format!("{} failed. Please try again.", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_taken_is_recognised() {
        let err = AppError::backend("Username already taken");
        assert_eq!(
            user_message(&err, "Registration"),
            "That username is already taken. Please choose another."
        );
    }

    #[test]
    fn unknown_backend_failure_uses_context() {
        let err = AppError::Backend {
            status: Some(500),
            message: "trap: canister rejected".into(),
        };
        assert_eq!(user_message(&err, "Download"), "Download failed. Please try again.");
    }

    #[test]
    fn validation_messages_pass_through() {
        let err = AppError::validation("Please enter a coupon code");
        assert_eq!(user_message(&err, "Coupon"), "Please enter a coupon code");
        assert_eq!(
            user_message(&AppError::NotLoggedIn, "Checkout"),
            "Please log in to continue"
        );
    }
}
