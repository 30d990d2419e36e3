// workstream-core/src/lib.rs
// ============================================================================
// Module: Workstream Core Library
// Description: Public API surface for the Workstream companies core.
// Purpose: Expose the company model, store interfaces, and resource handler.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Workstream core defines the `Company` record, its attribute validation, the
//! [`CompanyStore`] persistence interface, and the [`CompaniesResource`]
//! handler that maps CRUD operations onto a store. It is transport-agnostic;
//! HTTP status mapping lives in `workstream-api`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Clock;
pub use interfaces::CompanyStore;
pub use interfaces::StoreError;
pub use runtime::CompaniesResource;
pub use runtime::InMemoryCompanyStore;
pub use runtime::ResourceError;
pub use runtime::SharedCompanyStore;
