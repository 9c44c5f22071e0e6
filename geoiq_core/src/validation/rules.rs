//! Validation rules shared by the company and brand forms

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MIN_MISSION_STATEMENT_CHARS: usize = 20;

lazy_static! {
    static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
    static ref URL_REGEX: Regex = Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap();
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

/// Counts characters after trimming surrounding whitespace.
pub fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

pub fn validate_min_trimmed(value: &str, min: usize, label: &str) -> Result<(), ValidationError> {
    if trimmed_len(value) < min {
        return Err(rule_error(
            "too_short",
            format!("{} must be at least {} characters", label, min),
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    validate_min_trimmed(name, MIN_NAME_CHARS, "Name")
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    validate_min_trimmed(description, MIN_DESCRIPTION_CHARS, "Description")
}

pub fn validate_mission_statement(statement: &str) -> Result<(), ValidationError> {
    validate_min_trimmed(statement, MIN_MISSION_STATEMENT_CHARS, "Mission statement")
}

/// At least one entry that is not blank.
pub fn validate_non_empty_list(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().all(|value| value.trim().is_empty()) {
        return Err(rule_error(
            "required",
            "At least one entry is required".to_string(),
        ));
    }
    Ok(())
}

/// `#RRGGBB`, hex digits in either case.
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if !HEX_COLOR_REGEX.is_match(color) {
        return Err(rule_error(
            "invalid_color",
            "Color must be a hex value like #1A2B3C".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if !URL_REGEX.is_match(url) {
        return Err(rule_error(
            "invalid_url",
            "Website must be an http(s) URL".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rule_ignores_surrounding_whitespace() {
        assert!(validate_name("Ac").is_ok());
        assert!(validate_name("A").is_err());
        assert!(validate_name("  A  ").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_description_and_mission_lengths() {
        assert!(validate_description("123456789").is_err());
        assert!(validate_description("1234567890").is_ok());
        assert!(validate_mission_statement("too short mission").is_err());
        assert!(validate_mission_statement("A mission statement that is long enough.").is_ok());
    }

    #[test]
    fn test_hex_color() {
        assert!(validate_hex_color("#ABC123").is_ok());
        assert!(validate_hex_color("#abc123").is_ok());
        assert!(validate_hex_color("ABC123").is_err());
        assert!(validate_hex_color("#ZZZZZZ").is_err());
        assert!(validate_hex_color("#ABC").is_err());
        assert!(validate_hex_color("#ABC1234").is_err());
    }

    #[test]
    fn test_non_empty_list() {
        assert!(validate_non_empty_list(&[]).is_err());
        assert!(validate_non_empty_list(&["  ".to_string()]).is_err());
        assert!(validate_non_empty_list(&["MRR".to_string()]).is_ok());
    }

    #[test]
    fn test_error_carries_message() {
        let err = validate_name("A").unwrap_err();
        assert_eq!(err.code, "too_short");
        assert_eq!(
            err.message.as_deref(),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_url() {
        assert!(validate_url("https://acme.example").is_ok());
        assert!(validate_url("acme.example").is_err());
    }
}
