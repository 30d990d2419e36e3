// workstream-core/src/runtime/store.rs
// ============================================================================
// Module: Workstream In-Memory Store
// Description: Simple in-memory company store for tests and local runs.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`CompanyStore`] and a
//! clonable [`SharedCompanyStore`] wrapper used by hosts that pick a backend
//! at runtime. The in-memory store is not durable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::Company;
use crate::core::CompanyAttributes;
use crate::core::CompanyId;
use crate::core::NewCompany;
use crate::interfaces::CompanyStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable state guarded by the in-memory store mutex.
#[derive(Debug, Default)]
struct InMemoryState {
    /// Highest id ever assigned (ids are never reused).
    last_id: u64,
    /// Company records keyed by id.
    companies: BTreeMap<CompanyId, Company>,
}

/// In-memory company store for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCompanyStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryCompanyStore {
    /// Creates a new, empty in-memory company store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("company store mutex poisoned".to_string()))
    }
}

impl CompanyStore for InMemoryCompanyStore {
    fn list(&self) -> Result<Vec<Company>, StoreError> {
        Ok(self.lock()?.companies.values().cloned().collect())
    }

    fn get(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.lock()?.companies.get(&id).cloned())
    }

    fn insert(&self, company: NewCompany) -> Result<Company, StoreError> {
        let mut guard = self.lock()?;
        let next = guard
            .last_id
            .checked_add(1)
            .and_then(CompanyId::from_raw)
            .ok_or_else(|| StoreError::Store("company id overflow".to_string()))?;
        let record = Company {
            id: next,
            name: company.name,
            created_by: company.created_by,
            created_at: company.created_at,
            updated_at: company.created_at,
        };
        guard.last_id = next.get();
        guard.companies.insert(next, record.clone());
        drop(guard);
        Ok(record)
    }

    fn update(
        &self,
        id: CompanyId,
        attributes: &CompanyAttributes,
        updated_at: i64,
    ) -> Result<Option<Company>, StoreError> {
        let mut guard = self.lock()?;
        let Some(existing) = guard.companies.get_mut(&id) else {
            return Ok(None);
        };
        let mut record = existing.clone();
        attributes.apply_to(&mut record).map_err(|err| StoreError::Invalid(err.to_string()))?;
        record.updated_at = updated_at.max(record.created_at);
        existing.clone_from(&record);
        drop(guard);
        Ok(Some(record))
    }

    fn delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        Ok(self.lock()?.companies.remove(&id).is_some())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared company store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedCompanyStore {
    /// Inner store implementation.
    inner: Arc<dyn CompanyStore + Send + Sync>,
}

impl SharedCompanyStore {
    /// Wraps a company store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl CompanyStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn CompanyStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl CompanyStore for SharedCompanyStore {
    fn list(&self) -> Result<Vec<Company>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        self.inner.get(id)
    }

    fn insert(&self, company: NewCompany) -> Result<Company, StoreError> {
        self.inner.insert(company)
    }

    fn update(
        &self,
        id: CompanyId,
        attributes: &CompanyAttributes,
        updated_at: i64,
    ) -> Result<Option<Company>, StoreError> {
        self.inner.update(id, attributes, updated_at)
    }

    fn delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        self.inner.delete(id)
    }
}
