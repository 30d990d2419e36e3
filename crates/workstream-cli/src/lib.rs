// workstream-cli/src/lib.rs
// ============================================================================
// Module: Workstream CLI Library
// Description: Shared helpers for the Workstream command-line interface.
// Purpose: Provide reusable components (i18n, serve policy) for the binary and tests.
// Dependencies: workstream-config
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the message catalog and
//! the serve bind policy. The binary entry point (`src/main.rs`) imports these
//! helpers to keep all user-facing output consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Network exposure checks for `workstream serve`.
pub mod serve_policy;

#[cfg(test)]
mod tests;
