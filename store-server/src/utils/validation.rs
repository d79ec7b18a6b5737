//! Input validation helpers
//!
//! Centralized text length constants and validation functions for the
//! order-intake surface. SQLite TEXT has no built-in length enforcement,
//! so the limits live here.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Customer and product names
pub const MAX_NAME_LEN: usize = 200;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Short identifiers: phone numbers, external refs
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Shipping addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Order notes and item descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is present, non-blank and within the
/// length limit. Returns the trimmed value.
pub fn require_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<String, AppError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(value.to_string())
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
    fn test_require_text_trims_and_accepts() {
        assert_eq!(
            require_text(Some("  Ada Lovelace "), "name", MAX_NAME_LEN).unwrap(),
            "Ada Lovelace"
        );
    }

    #[test]
    fn test_require_text_rejects_missing_and_blank() {
        assert!(require_text(None, "name", MAX_NAME_LEN).is_err());
        assert!(require_text(Some("   "), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_require_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(require_text(Some(&long), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text_limit() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("ok".into()), "notes", MAX_NOTE_LEN).is_ok());
        let long = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_optional_text(&long, "notes", MAX_NOTE_LEN).is_err());
    }
}
