//! Shared validation patterns and error formatting.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationErrors};

use crate::constants::{MOBILE_PATTERN, NATIONAL_ID_PATTERN};
use crate::error::{DomainError, DomainResult};

pub static NATIONAL_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(NATIONAL_ID_PATTERN).expect("national id pattern is valid")
});

pub static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(MOBILE_PATTERN).expect("mobile pattern is valid"));

/// `^YYYY-MM-DD` prefix of an ISO date
pub static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date pattern is valid"));

pub fn is_national_id(value: &str) -> bool {
    NATIONAL_ID_RE.is_match(value)
}

pub fn is_mobile(value: &str) -> bool {
    MOBILE_RE.is_match(value)
}

/// Run derive-based validation and map failures to a domain error.
pub fn validate_input<T: Validate>(input: &T) -> DomainResult<()> {
    input
        .validate()
        .map_err(|e| DomainError::validation(format_validation_errors(&e)))
}

/// Format validation errors as `field: message` pairs, sorted by field name.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects rule failures that cannot be expressed with derive attributes.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    /// Record an error when `failed` holds.
    pub fn check(&mut self, failed: bool, field: &'static str, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Merge derive validation output with the collected errors.
    pub fn into_result_with<T: Validate>(self, input: &T) -> DomainResult<()> {
        let mut parts = Vec::new();
        if let Err(e) = input.validate() {
            parts.push(format_validation_errors(&e));
        }
        parts.extend(
            self.errors
                .into_iter()
                .map(|(field, message)| format!("{}: {}", field, message)),
        );

        if parts.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(parts.join(", ")))
        }
    }

    pub fn into_result(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(DomainError::validation(
            self.errors
                .into_iter()
                .map(|(field, message)| format!("{}: {}", field, message))
                .collect::<Vec<_>>()
                .join(", "),
        ))
    }
}
