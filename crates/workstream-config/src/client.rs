// workstream-config/src/client.rs
// ============================================================================
// Module: Client Configuration
// Description: Front-end client settings selected by deployment environment.
// Purpose: Expose API_SERVER_URI for the configured environment.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The front-end client needs exactly one setting, `API_SERVER_URI`. It is a
//! pure function of the deployment environment: `production` selects the
//! hosted API and every other value (including an unset variable) selects the
//! local development server.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming the deployment environment.
pub const CLIENT_ENV_VAR: &str = "WORKSTREAM_ENV";
/// API base URI used in production.
pub const PRODUCTION_API_SERVER_URI: &str = "https://workstream-app-api.herokuapp.com";
/// API base URI used everywhere else.
pub const DEVELOPMENT_API_SERVER_URI: &str = "http://localhost:3000";

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Deployment environment for the front-end client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientEnvironment {
    /// Production deployment.
    Production,
    /// Any non-production environment.
    #[default]
    Development,
}

impl ClientEnvironment {
    /// Classifies an environment name. Only the exact name `production`
    /// selects production.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name == "production" { Self::Production } else { Self::Development }
    }

    /// Reads the environment from [`CLIENT_ENV_VAR`].
    #[must_use]
    pub fn from_env() -> Self {
        env::var(CLIENT_ENV_VAR).map_or(Self::Development, |name| Self::from_name(&name))
    }

    /// Returns the API base URI for this environment.
    #[must_use]
    pub const fn api_server_uri(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_API_SERVER_URI,
            Self::Development => DEVELOPMENT_API_SERVER_URI,
        }
    }
}

impl fmt::Display for ClientEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}

// ============================================================================
// SECTION: Client Config
// ============================================================================

/// Client configuration handed to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Base URI of the companies API.
    #[serde(rename = "API_SERVER_URI")]
    pub api_server_uri: String,
}

impl ClientConfig {
    /// Builds the client configuration for an environment.
    #[must_use]
    pub fn for_environment(environment: ClientEnvironment) -> Self {
        Self {
            api_server_uri: environment.api_server_uri().to_string(),
        }
    }

    /// Builds the client configuration from [`CLIENT_ENV_VAR`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::for_environment(ClientEnvironment::from_env())
    }
}
