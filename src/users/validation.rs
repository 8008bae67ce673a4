use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::dto::CreateUserRequest;

pub const MIN_PASSWORD_LEN: usize = 6;

/// One failed rule on one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Creation rules. Every violation is collected, not just the first.
pub fn validate(candidate: &CreateUserRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if candidate.name.is_empty() {
        errors.push(FieldError::new("name", "name is required"));
    }
    if !is_valid_email(&candidate.email) {
        errors.push(FieldError::new("email", "email is not valid"));
    }
    if candidate.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "password must be at least 6 characters",
        ));
    }

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}
