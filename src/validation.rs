//! Input validation and sanitization module
//!
//! This module provides centralized input validation for:
//! - Customer input (username, email, payment references, coupon codes)
//! - Admin input (coupon definitions, price strings)
//! - Uploaded file names

use crate::errors::AppError;
use crate::models::{CouponDraft, DiscountType, FileType};
use crate::pricing;

/// Validation result type
pub type ValidationResult = Result<(), AppError>;

fn invalid(message: impl Into<String>) -> ValidationResult {
    Err(AppError::validation(message))
}

/// Coupon codes are compared in uppercase with surrounding whitespace removed.
pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate a (normalized) coupon code
/// - Non-empty, at most 32 characters
/// - Allowed: letters, digits, hyphen, underscore
pub fn validate_coupon_code(code: &str) -> ValidationResult {
    let trimmed = code.trim();

    if trimmed.is_empty() {
        return invalid("Please enter a coupon code");
    }

    if trimmed.chars().count() > 32 {
        return invalid("Coupon code must be at most 32 characters");
    }

    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return invalid("Coupon code may only contain letters, digits, '-' and '_'");
    }

    Ok(())
}

/// Validate a username
/// - Length: 3-50 characters
/// - Allowed: alphanumeric, underscore, hyphen
/// - Must start with a letter
pub fn validate_username(username: &str) -> ValidationResult {
    let trimmed = username.trim();

    let Some(first) = trimmed.chars().next() else {
        return invalid("Please enter a username");
    };

    let len = trimmed.chars().count();
    if !(3..=50).contains(&len) {
        return invalid("Username must be 3-50 characters");
    }

    if !first.is_alphabetic() {
        return invalid("Username must start with a letter");
    }

    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return invalid("Username may only contain letters, digits, '_' and '-'");
    }

    Ok(())
}

/// Validate email format: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return invalid("Please enter your email");
    }

    if trimmed.len() > 254 || trimmed.chars().any(char::is_whitespace) {
        return invalid("Please enter a valid email address");
    }

    let Some((local, domain)) = trimmed.split_once('@') else {
        return invalid("Please enter a valid email address");
    };

    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return invalid("Please enter a valid email address");
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => invalid("Please enter a valid email address"),
    }
}

/// Validate the transaction id / gift card code a customer pastes in.
pub fn validate_payment_reference(reference: &str) -> ValidationResult {
    let trimmed = reference.trim();

    if trimmed.is_empty() {
        return invalid("Please enter your payment reference");
    }

    if trimmed.len() > 200 {
        return invalid("Payment reference is too long (max 200 characters)");
    }

    Ok(())
}

/// Validate a coupon definition before it is persisted
/// - Percentage: 1-100 inclusive
/// - Fixed: more than zero pence
pub fn validate_coupon_draft(draft: &CouponDraft) -> ValidationResult {
    validate_coupon_code(&draft.code)?;
    validate_discount(draft.discount_type, draft.discount_value)
}

/// Discount value bounds, shared by coupon definitions and coupons
/// returned from the backend.
pub fn validate_discount(discount_type: DiscountType, value: u64) -> ValidationResult {
    match discount_type {
        DiscountType::Percentage if !(1..=100).contains(&value) => {
            invalid("Percentage discount must be between 1 and 100")
        }
        DiscountType::Fixed if value == 0 => invalid("Fixed discount must be greater than zero"),
        _ => Ok(()),
    }
}

/// Validate a price typed into an admin form and return it in pence.
pub fn validate_price_input(input: &str) -> Result<u64, AppError> {
    pricing::try_parse_price_to_minor(input)
        .map_err(|_| AppError::validation("Valid price is required"))
}

/// Validate an uploaded file name and detect its type.
pub fn validate_upload_file_name(file_name: &str) -> Result<FileType, AppError> {
    let trimmed = file_name.trim();

    if trimmed.is_empty() {
        return Err(AppError::validation("File name must not be empty"));
    }

    if trimmed.contains("..") || trimmed.contains('\0') || trimmed.contains(['/', '\\']) {
        return Err(AppError::validation("File name is not valid"));
    }

    FileType::from_file_name(trimmed).ok_or_else(|| {
        AppError::validation("Unsupported file type. Only .lua and .apk files are allowed")
    })
}

/// Reduce a file name to its last path component so it can be written
/// inside a target directory. Returns `None` when nothing usable remains.
pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let last = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .replace('\0', "");
    let last = last.trim();

    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}

/// Sanitize pasted input such as payment references (remove control
/// characters and surrounding whitespace)
pub fn sanitize_string(input: &str) -> String {
    input.trim().chars().filter(|c| !c.is_control()).collect()
}
