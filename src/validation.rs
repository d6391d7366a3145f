use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ApiError::Validation("Invalid email address".into()))
    }
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    let len = name.trim().chars().count();
    if (3..=30).contains(&len) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Name must be between 3 and 30 characters".into(),
        ))
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if (6..=30).contains(&len) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Password must be between 6 and 30 characters".into(),
        ))
    }
}

/// Trim and bound submission text. The length cap applies to the raw input.
pub fn validate_submission_text(text: &str) -> Result<String, ApiError> {
    if text.len() > 1000 {
        return Err(ApiError::Validation(
            "Text cannot exceed 1000 characters".into(),
        ));
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(
            "Text is required and cannot be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("ann@x.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "ann", "ann@", "@x.com", "ann@x", "a b@x.com"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Ann@X.Com "), "ann@x.com");
    }

    #[test]
    fn name_bounds() {
        assert!(validate_name("Ann Lee").is_ok());
        assert!(validate_name("Al").is_err());
        assert!(validate_name(&"x".repeat(31)).is_err());
        // length is checked after trimming
        assert!(validate_name("  Al  ").is_err());
    }

    #[test]
    fn password_bounds() {
        assert!(validate_password("password1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(31)).is_err());
    }

    #[test]
    fn submission_text_is_trimmed() {
        assert_eq!(validate_submission_text("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn submission_text_rejects_blank_and_oversized() {
        assert!(validate_submission_text("   ").is_err());
        assert!(validate_submission_text("").is_err());
        assert!(validate_submission_text(&"a".repeat(1001)).is_err());
        assert!(validate_submission_text(&"a".repeat(1000)).is_ok());
    }
}
