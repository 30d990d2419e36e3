// workstream-core/src/runtime/mod.rs
// ============================================================================
// Module: Workstream Runtime
// Description: Resource handler and reference store implementations.
// Purpose: Group the executable pieces of the core crate.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime components execute resource operations against a store.

pub mod resource;
pub mod store;

pub use resource::CompaniesResource;
pub use resource::ResourceError;
pub use store::InMemoryCompanyStore;
pub use store::SharedCompanyStore;
