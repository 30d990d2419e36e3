// workstream-api/src/lib.rs
// ============================================================================
// Module: Workstream API
// Description: HTTP surface for the Workstream companies resource.
// Purpose: Serve company CRUD over REST with header auth and audit logging.
// Dependencies: workstream-core, workstream-config, axum, tokio
// ============================================================================

//! ## Overview
//! Workstream API exposes [`workstream_core::CompaniesResource`] over HTTP.
//! Handlers validate request headers, delegate to the resource, map outcomes
//! to REST status codes, and record one audit event per request.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditSink;
pub use audit::ApiFileAuditSink;
pub use audit::ApiNoopAuditSink;
pub use audit::ApiOutcome;
pub use audit::ApiStderrAuditSink;
pub use auth::AuthContext;
pub use auth::AuthError;
pub use auth::DefaultAuthz;
pub use auth::RequestAuthz;
pub use auth::RequestContext;
pub use server::ApiServer;
pub use server::ApiServerError;
pub use server::SystemClock;
pub use workstream_config::WorkstreamConfig;
