// workstream-api/src/auth.rs
// ============================================================================
// Module: API Header Authentication
// Description: Header validation for inbound companies API requests.
// Purpose: Provide strict, fail-closed auth policies for HTTP requests.
// Dependencies: workstream-config, sha2, subtle, thiserror
// ============================================================================

//! ## Overview
//! This module defines the request authentication seam and the default
//! policies for local-only and bearer token enforcement. Successful checks
//! yield a caller subject: `loopback` for local-only access, or a SHA-256
//! fingerprint of the presented token. Raw tokens never leave this module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use workstream_config::ServerAuthConfig;
use workstream_config::ServerAuthMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted `Authorization` header size.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// Subject label for loopback callers in local-only mode.
pub const LOOPBACK_SUBJECT: &str = "loopback";

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request context used for auth decisions.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Authorization header value.
    pub auth_header: Option<String>,
}

impl RequestContext {
    /// Builds an HTTP request context.
    #[must_use]
    pub const fn http(peer_ip: Option<IpAddr>, auth_header: Option<String>) -> Self {
        Self {
            peer_ip,
            auth_header,
        }
    }

    /// Returns true when the peer IP is loopback.
    #[must_use]
    pub fn peer_is_loopback(&self) -> bool {
        self.peer_ip.is_some_and(|ip| ip.is_loopback())
    }
}

// ============================================================================
// SECTION: Auth Context
// ============================================================================

/// Authentication method used for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Loopback access in local-only mode.
    Local,
    /// Bearer token authentication.
    BearerToken,
}

/// Authenticated caller context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Authentication method.
    pub method: AuthMethod,
    /// Caller subject label.
    pub subject: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Missing or invalid authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Authentication interface for API requests.
pub trait RequestAuthz: Send + Sync {
    /// Authenticates a request. Returns the caller context on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the request headers do not satisfy policy.
    fn authorize(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError>;
}

// ============================================================================
// SECTION: Default Policy
// ============================================================================

/// Default auth policy derived from server config.
pub struct DefaultAuthz {
    /// Configured auth mode.
    mode: ServerAuthMode,
    /// Accepted bearer tokens.
    bearer_tokens: Vec<String>,
}

impl DefaultAuthz {
    /// Builds a default auth policy from server auth configuration.
    #[must_use]
    pub fn from_config(config: Option<&ServerAuthConfig>) -> Self {
        let mode = config.map_or(ServerAuthMode::LocalOnly, |cfg| cfg.mode);
        let bearer_tokens = config.map(|cfg| cfg.bearer_tokens.clone()).unwrap_or_default();
        Self {
            mode,
            bearer_tokens,
        }
    }

    /// Returns the configured auth mode.
    #[must_use]
    pub const fn mode(&self) -> ServerAuthMode {
        self.mode
    }
}

impl RequestAuthz for DefaultAuthz {
    fn authorize(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError> {
        match self.mode {
            ServerAuthMode::LocalOnly => authorize_local_only(ctx),
            ServerAuthMode::BearerToken => authorize_bearer(ctx, &self.bearer_tokens),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Accepts loopback peers only.
fn authorize_local_only(ctx: &RequestContext) -> Result<AuthContext, AuthError> {
    if ctx.peer_is_loopback() {
        Ok(AuthContext {
            method: AuthMethod::Local,
            subject: LOOPBACK_SUBJECT.to_string(),
        })
    } else {
        Err(AuthError::Unauthenticated("local-only mode requires loopback access".to_string()))
    }
}

/// Accepts a configured bearer token.
fn authorize_bearer(ctx: &RequestContext, tokens: &[String]) -> Result<AuthContext, AuthError> {
    let token = parse_bearer_token(ctx.auth_header.as_deref())?;
    // Constant-time comparison against every configured token.
    let matched = tokens.iter().fold(subtle::Choice::from(0), |acc, candidate| {
        acc | candidate.as_bytes().ct_eq(token.as_bytes())
    });
    if !bool::from(matched) {
        return Err(AuthError::Unauthenticated("invalid bearer token".to_string()));
    }
    Ok(AuthContext {
        method: AuthMethod::BearerToken,
        subject: token_fingerprint(token),
    })
}

/// Extracts the token from a `Bearer` authorization header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token)
}

/// Returns the lowercase hex SHA-256 fingerprint of a bearer token.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    hex_encode(&Sha256::digest(token.as_bytes()))
}

/// Encodes bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
