// workstream-core/src/core/company.rs
// ============================================================================
// Module: Company Records
// Description: Company record, insert payload, and mutable attribute set.
// Purpose: Define the persisted company shape and its validation rules.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Company`] is a plain record: a server-assigned id, a required name, an
//! opaque `created_by` user reference, and creation/update timestamps in unix
//! milliseconds. [`CompanyAttributes`] is the caller-supplied attribute set for
//! create and update; it distinguishes an attribute that is absent from one
//! explicitly set to `null`. Attribute values may arrive as JSON strings or
//! numbers; numbers are kept in their decimal string form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de;
use serde::de::Visitor;

use crate::core::identifiers::CompanyId;
use crate::core::validation::BLANK_MESSAGE;
use crate::core::validation::TOO_LONG_MESSAGE;
use crate::core::validation::ValidationErrors;
use crate::core::validation::is_blank;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum company name size in bytes.
pub const MAX_NAME_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Persisted company record.
///
/// # Invariants
/// - `name` is never blank.
/// - `created_at <= updated_at` when timestamps come from a monotonic clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Server-assigned identifier.
    pub id: CompanyId,
    /// Company display name.
    pub name: String,
    /// Opaque reference to the creating user.
    pub created_by: Option<String>,
    /// Creation time (unix epoch milliseconds).
    pub created_at: i64,
    /// Last update time (unix epoch milliseconds).
    pub updated_at: i64,
}

/// Insert payload handed to a store; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    /// Company display name (already validated).
    pub name: String,
    /// Opaque reference to the creating user.
    pub created_by: Option<String>,
    /// Creation time (unix epoch milliseconds); also the initial `updated_at`.
    pub created_at: i64,
}

// ============================================================================
// SECTION: Attributes
// ============================================================================

/// Caller-supplied company attributes for create and update.
///
/// Each field is `None` when absent from the payload and `Some(None)` when
/// explicitly `null`. Unknown fields (including `id`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompanyAttributes {
    /// Requested company name.
    #[serde(default, deserialize_with = "present_text")]
    pub name: Option<Option<String>>,
    /// Requested creator reference.
    #[serde(default, deserialize_with = "present_text")]
    pub created_by: Option<Option<String>>,
}

impl CompanyAttributes {
    /// Builds an attribute set that only sets the name.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(Some(name.into())),
            created_by: None,
        }
    }

    /// Validates the attributes for creating a new record.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when `name` is absent, `null`, blank, or
    /// longer than [`MAX_NAME_BYTES`].
    pub fn validate_for_create(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(self.name.as_ref().and_then(Option::as_deref), &mut errors);
        errors.into_result()
    }

    /// Validates only the attributes that were supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when a supplied `name` is `null`, blank,
    /// or longer than [`MAX_NAME_BYTES`].
    pub fn validate_for_update(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(name.as_deref(), &mut errors);
        }
        errors.into_result()
    }

    /// Applies the attributes to an existing record.
    ///
    /// Absent attributes leave the record unchanged. The record's timestamps
    /// are left for the caller to refresh. Nothing is applied when validation
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when the resulting record would be invalid.
    pub fn apply_to(&self, company: &mut Company) -> Result<(), ValidationErrors> {
        self.validate_for_update()?;
        if let Some(Some(name)) = &self.name {
            company.name.clone_from(name);
        }
        if let Some(created_by) = &self.created_by {
            company.created_by.clone_from(created_by);
        }
        Ok(())
    }
}

/// Records name failures: missing or blank, then oversized.
fn check_name(name: Option<&str>, errors: &mut ValidationErrors) {
    match name {
        Some(value) if value.len() > MAX_NAME_BYTES => errors.add("name", TOO_LONG_MESSAGE),
        Some(value) if !is_blank(value) => {}
        _ => errors.add("name", BLANK_MESSAGE),
    }
}

/// Deserializes a present text attribute, preserving `null`.
fn present_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TextOrNumber).map(Some)
}

/// Accepts a string, a number, or `null` as an attribute value.
struct TextOrNumber;

impl<'de> Visitor<'de> for TextOrNumber {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string, a number, or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
