//! Request validation.
//!
//! Validators collect every failing field instead of stopping at the first
//! one, so a client can fix a whole payload in one round trip.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::certificate::dates::parse_date;

/// One failing field.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ValidationError {
    /// Dotted path of the field, e.g. `mother.familyName`.
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str) -> Self {
        Self::new(field, format!("{} is required", field))
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' is not a valid date", value))
            .with_suggestion("Use the YYYY-MM-DD format, e.g. 2024-01-31")
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Email address is not valid")
            .with_suggestion("Use a full address, e.g. rasoa@example.mg")
    }

    pub fn invalid_phone(field: &str) -> Self {
        Self::new(field, "Phone number is not valid")
            .with_suggestion("Use a Malagasy mobile number, e.g. +261341234567 or 0341234567")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Every failing field of one request.
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by request payloads checked before any work is done.
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// ============================================================================
// Validation functions
// ============================================================================

pub fn validate_required(value: &str, field: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field));
    }
}

pub fn validate_date(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field));
        return;
    }
    if parse_date(trimmed).is_none() {
        errors.add(ValidationError::invalid_date(field, trimmed));
    }
}

/// Only checked when present.
pub fn validate_date_optional(value: Option<&str>, field: &str, errors: &mut ValidationErrors) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        validate_date(value, field, errors);
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'));
    if !valid {
        errors.add(ValidationError::invalid_email(field));
    }
}

/// Malagasy mobile numbers: `+261` or `0` followed by nine digits.
pub fn validate_phone(value: &str, field: &str, errors: &mut ValidationErrors) {
    let compact: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect();
    let national = compact
        .strip_prefix("+261")
        .or_else(|| compact.strip_prefix('0'));
    let valid = national.is_some_and(|digits| digits.len() == 9 && digits.chars().all(|c| c.is_ascii_digit()));
    if !valid {
        errors.add(ValidationError::invalid_phone(field));
    }
}
