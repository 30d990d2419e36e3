// workstream-core/tests/resource.rs
// ============================================================================
// Module: Companies Resource Tests
// Description: CRUD behavior of the companies resource over an in-memory store.
// Purpose: Validate status-independent resource semantics and error classes.
// Dependencies: workstream-core
// ============================================================================

//! ## Overview
//! Seeds ten companies and exercises every resource operation, including the
//! not-found and validation-failure paths.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::thread;

use workstream_core::Clock;
use workstream_core::CompaniesResource;
use workstream_core::Company;
use workstream_core::CompanyAttributes;
use workstream_core::CompanyId;
use workstream_core::CompanyStore;
use workstream_core::InMemoryCompanyStore;
use workstream_core::MAX_NAME_BYTES;
use workstream_core::NewCompany;
use workstream_core::ResourceError;
use workstream_core::StoreError;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Clock that advances by one millisecond per reading.
#[derive(Default)]
struct StepClock(AtomicI64);

impl Clock for StepClock {
    fn now_millis(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1_000
    }
}

fn seeded(count: usize) -> (CompaniesResource<InMemoryCompanyStore, StepClock>, Vec<CompanyId>) {
    let resource = CompaniesResource::new(InMemoryCompanyStore::new(), StepClock::default());
    let ids = (0 .. count)
        .map(|index| {
            let attributes: CompanyAttributes = serde_json::from_value(serde_json::json!({
                "name": format!("Company {index}"),
                "created_by": "1",
            }))
            .unwrap();
            resource.create(attributes, None).unwrap().id
        })
        .collect();
    (resource, ids)
}

fn id(raw: u64) -> CompanyId {
    CompanyId::from_raw(raw).unwrap()
}

fn created_by(value: &str) -> CompanyAttributes {
    serde_json::from_value(serde_json::json!({ "created_by": value })).unwrap()
}

/// Store that lands a competing `created_by` write just before each update.
struct CompetingWriterStore {
    inner: InMemoryCompanyStore,
}

impl CompanyStore for CompetingWriterStore {
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
        self.inner.update(id, &created_by("99"), updated_at)?;
        self.inner.update(id, attributes, updated_at)
    }

    fn delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        self.inner.delete(id)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn list_returns_all_seeded_companies() {
    let (resource, ids) = seeded(10);
    let companies = resource.list().unwrap();
    assert_eq!(companies.len(), 10);
    let listed: Vec<CompanyId> = companies.iter().map(|company| company.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn list_is_empty_without_records() {
    let (resource, _) = seeded(0);
    assert!(resource.list().unwrap().is_empty());
}

#[test]
fn get_returns_requested_company() {
    let (resource, ids) = seeded(10);
    let company = resource.get(ids[0]).unwrap();
    assert_eq!(company.id, ids[0]);
    assert_eq!(company.name, "Company 0");
}

#[test]
fn get_unknown_id_is_not_found() {
    let (resource, _) = seeded(10);
    let err = resource.get(id(100)).unwrap_err();
    assert!(matches!(err, ResourceError::NotFound { .. }));
    assert_eq!(err.to_string(), "Couldn't find Company with 'id'=100");
}

#[test]
fn create_returns_record_with_name() {
    let (resource, _) = seeded(0);
    let company = resource.create(CompanyAttributes::with_name("Workstream"), None).unwrap();
    assert_eq!(company.name, "Workstream");
    assert_eq!(company.created_at, company.updated_at);
    assert_eq!(resource.get(company.id).unwrap(), company);
}

#[test]
fn create_without_name_fails_validation() {
    let (resource, _) = seeded(0);
    let err = resource.create(CompanyAttributes::default(), None).unwrap_err();
    assert!(matches!(err, ResourceError::ValidationFailed(_)));
    assert_eq!(err.to_string(), "Validation failed: Name can't be blank");
    assert!(resource.list().unwrap().is_empty());
}

#[test]
fn create_records_default_creator_when_absent() {
    let (resource, _) = seeded(0);
    let company =
        resource.create(CompanyAttributes::with_name("Workstream"), Some("loopback")).unwrap();
    assert_eq!(company.created_by.as_deref(), Some("loopback"));

    let explicit: CompanyAttributes =
        serde_json::from_str(r#"{"name":"Other","created_by":"42"}"#).unwrap();
    let company = resource.create(explicit, Some("loopback")).unwrap();
    assert_eq!(company.created_by.as_deref(), Some("42"));
}

#[test]
fn update_applies_attributes_and_refreshes_timestamp() {
    let (resource, ids) = seeded(10);
    let before = resource.get(ids[0]).unwrap();
    let updated = resource.update(ids[0], &CompanyAttributes::with_name("Soup Spoon")).unwrap();
    assert_eq!(updated.name, "Soup Spoon");
    assert_eq!(updated.created_by, before.created_by);
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);
    assert_eq!(resource.get(ids[0]).unwrap(), updated);
}

#[test]
fn update_unknown_id_is_not_found() {
    let (resource, _) = seeded(3);
    let err = resource.update(id(100), &CompanyAttributes::with_name("Soup Spoon")).unwrap_err();
    assert!(matches!(err, ResourceError::NotFound { .. }));
}

#[test]
fn update_with_blank_name_fails_and_keeps_record() {
    let (resource, ids) = seeded(1);
    let err = resource.update(ids[0], &CompanyAttributes::with_name(" ")).unwrap_err();
    assert!(matches!(err, ResourceError::ValidationFailed(_)));
    assert_eq!(resource.get(ids[0]).unwrap().name, "Company 0");
}

#[test]
fn update_unknown_id_with_blank_name_is_not_found() {
    let (resource, _) = seeded(1);
    let err = resource.update(id(100), &CompanyAttributes::with_name("")).unwrap_err();
    assert!(matches!(err, ResourceError::NotFound { .. }));
}

#[test]
fn oversized_name_fails_validation() {
    let (resource, ids) = seeded(1);
    let name = "x".repeat(MAX_NAME_BYTES + 1);
    let err = resource.create(CompanyAttributes::with_name(name.clone()), None).unwrap_err();
    assert_eq!(err.to_string(), "Validation failed: Name is too long");
    let err = resource.update(ids[0], &CompanyAttributes::with_name(name)).unwrap_err();
    assert!(matches!(err, ResourceError::ValidationFailed(_)));
    assert_eq!(resource.list().unwrap().len(), 1);
}

#[test]
fn update_keeps_competing_write_to_other_attribute() {
    let store = CompetingWriterStore {
        inner: InMemoryCompanyStore::new(),
    };
    let resource = CompaniesResource::new(store, StepClock::default());
    let company = resource.create(CompanyAttributes::with_name("Workstream"), Some("1")).unwrap();

    let updated = resource.update(company.id, &CompanyAttributes::with_name("Soup Spoon")).unwrap();

    assert_eq!(updated.name, "Soup Spoon");
    assert_eq!(updated.created_by.as_deref(), Some("99"));
    assert_eq!(resource.get(company.id).unwrap(), updated);
}

#[test]
fn concurrent_partial_updates_all_survive() {
    let (resource, ids) = seeded(1);
    let target = ids[0];
    thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0 .. 200 {
                let attributes = CompanyAttributes::with_name(format!("name-{round}"));
                resource.update(target, &attributes).unwrap();
            }
        });
        scope.spawn(|| {
            for round in 0 .. 200 {
                resource.update(target, &created_by(&format!("creator-{round}"))).unwrap();
            }
        });
    });
    let company = resource.get(target).unwrap();
    assert_eq!(company.name, "name-199");
    assert_eq!(company.created_by.as_deref(), Some("creator-199"));
}

#[test]
fn delete_removes_record() {
    let (resource, ids) = seeded(10);
    resource.delete(ids[0]).unwrap();
    assert_eq!(resource.list().unwrap().len(), 9);
    assert!(matches!(resource.get(ids[0]), Err(ResourceError::NotFound { .. })));
}

#[test]
fn delete_unknown_id_succeeds() {
    let (resource, _) = seeded(2);
    resource.delete(id(100)).unwrap();
    assert_eq!(resource.store().list().unwrap().len(), 2);
}
