// workstream-core/src/core/identifiers.rs
// ============================================================================
// Module: Workstream Identifiers
// Description: Server-assigned identifiers for company records.
// Purpose: Provide a strongly typed, serializable id with a stable numeric form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Company identifiers are assigned by the store on insert, are never reused,
//! and serialize as plain JSON numbers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Company identifier.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
/// - Immutable once assigned by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(NonZeroU64);

impl CompanyId {
    /// Creates a new company identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a company identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Parses a path segment into a company identifier.
    ///
    /// Only plain ASCII digits are accepted; signs, whitespace, and zero are
    /// rejected.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        raw.parse::<u64>().ok().and_then(Self::from_raw)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::CompanyId;

    #[test]
    fn parse_accepts_positive_digits() {
        assert_eq!(CompanyId::parse("42").map(CompanyId::get), Some(42));
    }

    #[test]
    fn parse_rejects_zero_and_non_digits() {
        for raw in ["", "0", "-1", "+3", " 7", "7a", "abc", "1.5"] {
            assert!(CompanyId::parse(raw).is_none(), "{raw} should not parse");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(CompanyId::parse("99999999999999999999999").is_none());
    }
}
