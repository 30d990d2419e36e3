// workstream-core/src/core/validation.rs
// ============================================================================
// Module: Workstream Attribute Validation
// Description: Field-level validation failures for company attributes.
// Purpose: Collect constraint failures and render them as full messages.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Validation failures are collected per field and rendered in the familiar
//! `Validation failed: Name can't be blank` form: a fixed prefix followed by
//! each failure as a humanized attribute name and its message, joined with
//! `, `.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix applied to every rendered validation failure.
pub const VALIDATION_FAILED_PREFIX: &str = "Validation failed";
/// Message for a required attribute that is absent or blank.
pub const BLANK_MESSAGE: &str = "can't be blank";
/// Message for an attribute that exceeds its size limit.
pub const TOO_LONG_MESSAGE: &str = "is too long";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A single failed attribute constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Attribute name in snake case (e.g. `name`).
    pub field: &'static str,
    /// Constraint message (e.g. `can't be blank`).
    pub message: &'static str,
}

impl FieldError {
    /// Returns the full message with a humanized attribute name.
    #[must_use]
    pub fn full_message(&self) -> String {
        format!("{} {}", humanize(self.field), self.message)
    }
}

/// Ordered collection of attribute constraint failures.
///
/// # Invariants
/// - Failures are kept in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{}: {}", VALIDATION_FAILED_PREFIX, join_full_messages(.0))]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a constraint failure for `field`.
    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError {
            field,
            message,
        });
    }

    /// Returns true when no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns the full messages for every failure.
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        self.0.iter().map(FieldError::full_message).collect()
    }

    /// Converts the collection into a result, failing when non-empty.
    ///
    /// # Errors
    ///
    /// Returns the collection itself when any failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the value is empty or whitespace-only.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Joins full messages with `, ` in recorded order.
fn join_full_messages(errors: &[FieldError]) -> String {
    errors.iter().map(FieldError::full_message).collect::<Vec<_>>().join(", ")
}

/// Converts a snake case attribute name into a capitalized, spaced label.
fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::BLANK_MESSAGE;
    use super::TOO_LONG_MESSAGE;
    use super::ValidationErrors;
    use super::humanize;
    use super::is_blank;

    #[test]
    fn renders_single_failure() {
        let mut errors = ValidationErrors::new();
        errors.add("name", BLANK_MESSAGE);
        assert_eq!(errors.to_string(), "Validation failed: Name can't be blank");
    }

    #[test]
    fn renders_multiple_failures_in_order() {
        let mut errors = ValidationErrors::new();
        errors.add("name", BLANK_MESSAGE);
        errors.add("created_by", "is invalid");
        assert_eq!(
            errors.to_string(),
            "Validation failed: Name can't be blank, Created by is invalid"
        );
    }

    #[test]
    fn is_a_std_error() {
        let mut errors = ValidationErrors::new();
        errors.add("name", TOO_LONG_MESSAGE);
        let boxed: Box<dyn std::error::Error> = Box::new(errors);
        assert_eq!(boxed.to_string(), "Validation failed: Name is too long");
        assert!(boxed.source().is_none());
    }

    #[test]
    fn empty_collection_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn humanize_handles_empty_field() {
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" a "));
    }
}
