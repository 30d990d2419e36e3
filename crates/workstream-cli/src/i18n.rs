// workstream-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The Workstream CLI stores user-facing strings in a small translation
//! catalog to keep operator messaging consistent. All runtime output should be
//! routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries loaded into the message bundle.
pub(crate) const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "workstream {version}"),
    (
        "serve.warn.local_only_auth",
        "Info: running in local-only mode (loopback callers only). Configure server.auth with \
         mode = \"bearer_token\" before exposing the API beyond localhost.",
    ),
    (
        "serve.warn.network_exposure",
        "Warning: serving plain HTTP on non-loopback address {bind} (auth={auth}, audit={audit}). \
         Terminate TLS upstream; bearer tokens are sent in the clear otherwise.",
    ),
    ("serve.listening", "Listening on http://{addr}"),
    ("serve.config.load_failed", "Failed to load config: {error}"),
    ("serve.init_failed", "Failed to initialize server: {error}"),
    ("serve.bind_failed", "Failed to bind {bind}: {error}"),
    ("serve.failed", "Server failed: {error}"),
    (
        "serve.bind.allow_env_invalid",
        "Invalid {env} value '{value}'; expected true/false, 1/0, yes/no, or on/off.",
    ),
    ("serve.bind.parse_failed", "Invalid bind address {bind}: {error}"),
    (
        "serve.bind.non_loopback_opt_in",
        "Refusing to bind non-loopback address {bind}. Pass --allow-non-loopback or set {env}=1.",
    ),
    (
        "serve.bind.non_loopback_auth_required",
        "Refusing to bind non-loopback address {bind} without server.auth bearer_token.",
    ),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("client_config.serialize_failed", "Failed to serialize client config: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static English catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
