// workstream-config/src/lib.rs
// ============================================================================
// Module: Workstream Config Library
// Description: Canonical server config model and client config provider.
// Purpose: Single source of truth for workstream.toml semantics.
// Dependencies: workstream-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `workstream-config` defines the server configuration model loaded from
//! `workstream.toml` with strict, fail-closed validation, and the client
//! configuration that selects `API_SERVER_URI` by deployment environment.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::*;
pub use config::*;
