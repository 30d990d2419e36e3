// workstream-core/src/runtime/resource.rs
// ============================================================================
// Module: Companies Resource
// Description: CRUD operations over company records.
// Purpose: Map resource operations onto a store and classify failures.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! [`CompaniesResource`] implements list, get, create, update, and delete on
//! top of any [`CompanyStore`]. Failures are classified as
//! [`ResourceError::NotFound`], [`ResourceError::ValidationFailed`], or a
//! store failure; transports map these onto status codes.
//!
//! Delete is idempotent: removing an unknown id succeeds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Company;
use crate::core::CompanyAttributes;
use crate::core::CompanyId;
use crate::core::NewCompany;
use crate::core::ValidationErrors;
use crate::interfaces::Clock;
use crate::interfaces::CompanyStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resource operation failures.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The referenced company does not exist.
    #[error("Couldn't find Company with 'id'={id}")]
    NotFound {
        /// Requested identifier as supplied by the caller.
        id: String,
    },
    /// The supplied attributes violate a constraint.
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResourceError {
    /// Builds a not-found error for the supplied identifier text.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
        }
    }
}

// ============================================================================
// SECTION: Resource
// ============================================================================

/// Companies resource handler.
#[derive(Debug, Clone)]
pub struct CompaniesResource<S, C> {
    /// Backing company store.
    store: S,
    /// Timestamp source for record creation and updates.
    clock: C,
}

impl<S, C> CompaniesResource<S, C>
where
    S: CompanyStore,
    C: Clock,
{
    /// Creates a resource handler over the provided store and clock.
    #[must_use]
    pub const fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Lists every company ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Store`] when the store fails.
    pub fn list(&self) -> Result<Vec<Company>, ResourceError> {
        Ok(self.store.list()?)
    }

    /// Fetches a single company.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the id is unknown.
    pub fn get(&self, id: CompanyId) -> Result<Company, ResourceError> {
        self.store.get(id)?.ok_or_else(|| ResourceError::not_found(id.to_string()))
    }

    /// Creates a company from the supplied attributes.
    ///
    /// `default_creator` is recorded as `created_by` when the attributes do
    /// not name one.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ValidationFailed`] when `name` is absent or
    /// blank.
    pub fn create(
        &self,
        attributes: CompanyAttributes,
        default_creator: Option<&str>,
    ) -> Result<Company, ResourceError> {
        attributes.validate_for_create()?;
        let CompanyAttributes {
            name,
            created_by,
        } = attributes;
        let name = name.flatten().unwrap_or_default();
        let created_by = created_by.unwrap_or_else(|| default_creator.map(str::to_string));
        let record = NewCompany {
            name,
            created_by,
            created_at: self.clock.now_millis(),
        };
        Ok(self.store.insert(record)?)
    }

    /// Applies the supplied attributes to an existing company.
    ///
    /// The store performs the read and write atomically, so concurrent
    /// updates of different attributes do not overwrite each other.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when the id is unknown and
    /// [`ResourceError::ValidationFailed`] when the result would be invalid.
    pub fn update(
        &self,
        id: CompanyId,
        attributes: &CompanyAttributes,
    ) -> Result<Company, ResourceError> {
        if let Err(errors) = attributes.validate_for_update() {
            self.get(id)?;
            return Err(errors.into());
        }
        self.store
            .update(id, attributes, self.clock.now_millis())?
            .ok_or_else(|| ResourceError::not_found(id.to_string()))
    }

    /// Deletes a company. Unknown ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Store`] when the store fails.
    pub fn delete(&self, id: CompanyId) -> Result<(), ResourceError> {
        self.store.delete(id)?;
        Ok(())
    }
}
