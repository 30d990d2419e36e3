// workstream-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for workstream-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use workstream_config::ServerAuthConfig;
use workstream_config::ServerAuthMode;
use workstream_config::WorkstreamConfig;

/// Parses a TOML string into a `WorkstreamConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<WorkstreamConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<WorkstreamConfig, toml::de::Error> {
    config_from_toml("")
}

/// Returns a bearer-token auth config with the provided tokens.
pub fn bearer_auth(tokens: &[&str]) -> ServerAuthConfig {
    ServerAuthConfig {
        mode: ServerAuthMode::BearerToken,
        bearer_tokens: tokens.iter().map(ToString::to_string).collect(),
    }
}

/// Returns a minimal config with the provided auth config.
pub fn config_with_auth(auth: ServerAuthConfig) -> Result<WorkstreamConfig, toml::de::Error> {
    let mut config = minimal_config()?;
    config.server.auth = Some(auth);
    Ok(config)
}
