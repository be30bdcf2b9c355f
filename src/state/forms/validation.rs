//! Field validation rules

use super::field::{parse_amount, FormField};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// A check applied to one field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    /// Exactly 11 digits, e.g. 03001234567
    Phone,
    /// PK + 2 digits + 4 letters + 16 digits
    Iban,
    /// 13 digits, dashes allowed
    Cnic,
    Amount,
    /// Path to an existing local file
    FileExists,
}

/// Whether relaxable steps are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Strict,
    #[default]
    Lenient,
}

/// Result of validating a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            field_errors: BTreeMap::new(),
        }
    }

    /// Add an error unless the field already has one
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
        self.valid = false;
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

fn iban_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^PK\d{2}[A-Z]{4}\d{16}$").expect("valid IBAN pattern"))
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    value.len() == 11 && value.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_iban(value: &str) -> bool {
    iban_regex().is_match(value.trim())
}

pub fn is_valid_cnic(value: &str) -> bool {
    let digits: Vec<char> = value.trim().chars().filter(|c| *c != '-').collect();
    digits.len() == 13 && digits.iter().all(|c| c.is_ascii_digit())
}

/// Check one value against one rule, returning the error message on failure
pub fn check(rule: Rule, value: &str) -> Option<&'static str> {
    let blank = value.trim().is_empty();
    match rule {
        Rule::Required if blank => Some("This field is required"),
        // format rules only apply to filled-in values
        _ if blank => None,
        Rule::Required => None,
        Rule::Email if !is_valid_email(value) => Some("Enter a valid email address"),
        Rule::Phone if !is_valid_phone(value) => Some("Phone must be 11 digits, e.g. 03001234567"),
        Rule::Iban if !is_valid_iban(value) => {
            Some("IBAN must look like PK00ABCD0000000000000000")
        }
        Rule::Cnic if !is_valid_cnic(value) => Some("CNIC must be 13 digits"),
        Rule::Amount if parse_amount(value).is_none() => Some("Enter a whole amount in rupees"),
        Rule::FileExists if !Path::new(value.trim()).is_file() => Some("File not found"),
        _ => None,
    }
}

/// Validate every field's rules, keeping the first failure per field
pub fn validate_fields(fields: &[FormField]) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for field in fields {
        if let Some(message) = field.rules.iter().find_map(|r| check(*r, field.as_text())) {
            result.add(&field.name, message);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iban_format() {
        assert!(is_valid_iban("PK00AAAA0000000000000000"));
        assert!(is_valid_iban("PK36SCBL0000001123456702"));
        assert!(!is_valid_iban("PK0AAAA00000000000000000"));
        assert!(!is_valid_iban("PK00AAA00000000000000000"));
        assert!(!is_valid_iban("GB00AAAA0000000000000000"));
        assert!(!is_valid_iban("PK00aaaa0000000000000000"));
        assert!(!is_valid_iban("PK00AAAA00000000000000000"));
    }

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("03001234567"));
        assert!(!is_valid_phone("0300123456"));
        assert!(!is_valid_phone("0300-1234567"));
        assert!(!is_valid_phone("+923001234567"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("someone@example.pk"));
        assert!(!is_valid_email("someone@"));
        assert!(!is_valid_email("some one@example.pk"));
        assert!(!is_valid_email("example.pk"));
    }

    #[test]
    fn test_cnic_format() {
        assert!(is_valid_cnic("35202-1234567-1"));
        assert!(is_valid_cnic("3520212345671"));
        assert!(!is_valid_cnic("35202-1234567"));
    }

    #[test]
    fn test_optional_fields_skip_format_rules() {
        assert_eq!(check(Rule::Email, ""), None);
        assert_eq!(check(Rule::Iban, "   "), None);
        assert!(check(Rule::Required, " ").is_some());
    }

    #[test]
    fn test_amount_rule() {
        assert_eq!(check(Rule::Amount, "1,200,000"), None);
        assert!(check(Rule::Amount, "99999999999999999999999").is_some());
    }

    #[test]
    fn test_validate_fields_reports_first_error_per_field() {
        let fields = vec![
            FormField::text("email", "Email")
                .required()
                .with_rule(Rule::Email),
            FormField::text_with_value("phone", "Phone", "123").with_rule(Rule::Phone),
            FormField::text_with_value("name", "Name", "Sana").required(),
        ];
        let result = validate_fields(&fields);
        assert!(!result.valid);
        assert_eq!(
            result.field_errors.get("email").map(String::as_str),
            Some("This field is required")
        );
        assert!(result.field_errors.contains_key("phone"));
        assert!(!result.field_errors.contains_key("name"));
    }

    #[test]
    fn test_file_exists_rule() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(check(Rule::FileExists, &path), None);
        assert!(check(Rule::FileExists, "/definitely/not/here.pdf").is_some());
    }

    #[test]
    fn test_validation_mode_defaults_to_lenient() {
        assert_eq!(ValidationMode::default(), ValidationMode::Lenient);
        let parsed: ValidationMode = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(parsed, ValidationMode::Strict);
    }
}
