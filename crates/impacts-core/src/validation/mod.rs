//! Validation helpers shared by request DTOs and the ingestion form.
//!
//! The `validator` derive covers lengths and ranges; the functions here cover the
//! "empty or well-formed" rules used for optional text fields.

use std::borrow::Cow;
use validator::{ValidateEmail, ValidateUrl, ValidationError};

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Upper bound for any page size
pub const MAX_PAGE_SIZE: i64 = 100;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Reject strings that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_blank", "Field cannot be blank"));
    }
    Ok(())
}

/// Accept an empty string or a well-formed URL.
pub fn optional_url(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.validate_url() {
        Ok(())
    } else {
        Err(error("url", "Website must be a valid URL"))
    }
}

/// Accept an empty string or a well-formed email address.
pub fn optional_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.validate_email() {
        Ok(())
    } else {
        Err(error("email", "Contact email must be a valid email address"))
    }
}

/// Normalize 1-based page/limit query parameters into (limit, offset).
/// The offset saturates, so an absurd page is simply past the end.
pub fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    (limit, (page - 1).saturating_mul(limit))
}
