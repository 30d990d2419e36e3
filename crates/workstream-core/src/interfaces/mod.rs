// workstream-core/src/interfaces/mod.rs
// ============================================================================
// Module: Workstream Interfaces
// Description: Backend-agnostic persistence and time interfaces.
// Purpose: Define the seams stores and hosts implement for the resource handler.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`CompanyStore`] is the persistence seam for company records and [`Clock`]
//! supplies wall-clock timestamps. The core never reads wall-clock time
//! directly; hosts provide a clock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Company;
use crate::core::CompanyAttributes;
use crate::core::CompanyId;
use crate::core::NewCompany;

// ============================================================================
// SECTION: Company Store
// ============================================================================

/// Company store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("company store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("company store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("company store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("company store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("company store error: {0}")]
    Store(String),
}

/// Persistence interface for company records.
pub trait CompanyStore {
    /// Lists every company ordered by ascending id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&self) -> Result<Vec<Company>, StoreError>;

    /// Loads a company by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, id: CompanyId) -> Result<Option<Company>, StoreError>;

    /// Inserts a new company and returns the stored record with its id.
    ///
    /// Ids are assigned monotonically and never reused.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when inserting fails.
    fn insert(&self, company: NewCompany) -> Result<Company, StoreError>;

    /// Applies `attributes` to an existing company and stamps `updated_at`
    /// (never earlier than `created_at`). Returns `None` when the id is
    /// unknown.
    ///
    /// The read, apply, and write happen atomically: concurrent partial
    /// updates of different attributes all survive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails or the attributes do not
    /// produce a valid record.
    fn update(
        &self,
        id: CompanyId,
        attributes: &CompanyAttributes,
        updated_at: i64,
    ) -> Result<Option<Company>, StoreError>;

    /// Deletes a company. Returns false when the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deleting fails.
    fn delete(&self, id: CompanyId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source for record timestamps.
pub trait Clock {
    /// Returns the current time as unix epoch milliseconds.
    fn now_millis(&self) -> i64;
}
