//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on reasonable UX limits for names, notes
//! and contact fields; the embedded store has no built-in length
//! enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: event title, venue, city, ticket type, customer name
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions (event blurbs, achievement text)
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Short identifiers: phone numbers, time-of-day strings
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Aline", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn optional_text_checks_length_only_when_present() {
        assert!(validate_optional_text(&None, "email", MAX_EMAIL_LEN).is_ok());
        let long = Some("x".repeat(MAX_EMAIL_LEN + 1));
        assert!(validate_optional_text(&long, "email", MAX_EMAIL_LEN).is_err());
    }
}
