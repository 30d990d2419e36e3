// workstream-core/src/core/mod.rs
// ============================================================================
// Module: Workstream Core Types
// Description: Company records, identifiers, and attribute validation.
// Purpose: Group the data model shared by stores and transports.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain serializable records. They carry no persistence or
//! transport behavior.

pub mod company;
pub mod identifiers;
pub mod validation;

pub use company::Company;
pub use company::CompanyAttributes;
pub use company::MAX_NAME_BYTES;
pub use company::NewCompany;
pub use identifiers::CompanyId;
pub use validation::FieldError;
pub use validation::ValidationErrors;
pub use validation::is_blank;
