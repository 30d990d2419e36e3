// workstream-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure policy checks for the CLI server launcher.
// Purpose: Enforce safe-by-default bind behavior with explicit opt-in.
// Dependencies: workstream-config, std
// ============================================================================

//! ## Overview
//! Provides safety checks for binding the companies API to non-loopback
//! addresses. The policy is fail-closed: explicit opt-in is required, and
//! bearer token auth must be configured before network exposure is allowed.

use std::env;
use std::net::SocketAddr;

use workstream_config::ServerAuthMode;
use workstream_config::WorkstreamConfig;

use crate::t;

/// Environment variable enabling non-loopback server binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "WORKSTREAM_ALLOW_NON_LOOPBACK";

/// Bind outcome metadata for serve warnings.
#[derive(Debug, Clone)]
pub struct BindOutcome {
    /// Parsed bind address.
    pub bind_addr: SocketAddr,
    /// True when the server is bound to a non-loopback address.
    pub network_exposed: bool,
    /// Effective auth mode.
    pub auth_mode: ServerAuthMode,
    /// Whether audit logging is enabled.
    pub audit_enabled: bool,
}

/// Serve policy failures for bind safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// Bind string failed to parse.
    InvalidBind {
        /// Raw bind value.
        bind: String,
        /// Parse error message.
        error: String,
    },
    /// Non-loopback binding requires explicit opt-in.
    NonLoopbackOptInRequired {
        /// Bind address.
        bind: String,
    },
    /// Non-loopback binding requires auth.
    NonLoopbackAuthRequired {
        /// Bind address.
        bind: String,
    },
}

impl std::fmt::Display for ServePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::InvalidEnv {
                value,
            } => t!("serve.bind.allow_env_invalid", env = ALLOW_NON_LOOPBACK_ENV, value = value),
            Self::InvalidBind {
                bind,
                error,
            } => t!("serve.bind.parse_failed", bind = bind, error = error),
            Self::NonLoopbackOptInRequired {
                bind,
            } => t!("serve.bind.non_loopback_opt_in", bind = bind, env = ALLOW_NON_LOOPBACK_ENV),
            Self::NonLoopbackAuthRequired {
                bind,
            } => t!("serve.bind.non_loopback_auth_required", bind = bind),
        };
        write!(f, "{message}")
    }
}

impl std::error::Error for ServePolicyError {}

/// Resolves the non-loopback opt-in flag from CLI and environment.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    let value = value.to_string_lossy().to_string();
    parse_allow_non_loopback_value(&value)
}

/// Enforces local-only bind restrictions for the API server.
///
/// # Errors
/// Returns [`ServePolicyError`] when configuration violates exposure requirements.
pub fn enforce_local_only(
    config: &WorkstreamConfig,
    allow_non_loopback: bool,
) -> Result<BindOutcome, ServePolicyError> {
    let bind = config.server.bind.trim();
    let bind_addr: SocketAddr =
        bind.parse().map_err(|err: std::net::AddrParseError| ServePolicyError::InvalidBind {
            bind: bind.to_string(),
            error: err.to_string(),
        })?;
    let auth_mode = config.server.auth_mode();
    let audit_enabled = config.server.audit.enabled;
    if bind_addr.ip().is_loopback() {
        return Ok(BindOutcome {
            bind_addr,
            network_exposed: false,
            auth_mode,
            audit_enabled,
        });
    }
    if !allow_non_loopback {
        return Err(ServePolicyError::NonLoopbackOptInRequired {
            bind: bind.to_string(),
        });
    }
    // `WorkstreamConfig::load` rejects this too; configs built in code do not pass through it.
    if auth_mode == ServerAuthMode::LocalOnly {
        return Err(ServePolicyError::NonLoopbackAuthRequired {
            bind: bind.to_string(),
        });
    }
    Ok(BindOutcome {
        bind_addr,
        network_exposed: true,
        auth_mode,
        audit_enabled,
    })
}

/// Parses a bool-ish string (true/false/1/0/yes/no/on/off).
fn parse_boolish(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parses an env value for allow-non-loopback.
pub(crate) fn parse_allow_non_loopback_value(value: &str) -> Result<bool, ServePolicyError> {
    parse_boolish(value).map_or_else(
        || {
            Err(ServePolicyError::InvalidEnv {
                value: value.to_string(),
            })
        },
        Ok,
    )
}
