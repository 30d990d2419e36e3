// workstream-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Company Store
// Description: Durable CompanyStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for company records.
// Dependencies: workstream-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`CompanyStore`] implementation. Ids
//! are assigned by an `AUTOINCREMENT` primary key so deleted ids are never
//! reused. The schema is versioned and mismatches fail closed.
//!
//! [`CompanyStore`]: workstream_core::CompanyStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_NAME_BYTES;
pub use store::SqliteCompanyStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
