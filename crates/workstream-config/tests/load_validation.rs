// workstream-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Tests
// Description: File loading, size limits, and store section validation.
// Purpose: Ensure workstream.toml loads fail closed.
// ============================================================================

//! ## Overview
//! Loads config files from disk and validates the `[store]` section.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use workstream_config::ConfigError;
use workstream_config::ServerAuthMode;
use workstream_config::StoreType;
use workstream_config::WorkstreamConfig;
use workstream_store_sqlite::SqliteStoreMode;
use workstream_store_sqlite::SqliteSyncMode;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("workstream.toml");
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn loads_full_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
bind = "0.0.0.0:8080"
max_body_bytes = 4096

[server.auth]
mode = "bearer_token"
bearer_tokens = ["alpha", "beta"]

[server.audit]
enabled = true
path = "logs/audit.jsonl"

[store]
type = "sqlite"
path = "data/companies.db"
busy_timeout_ms = 250
journal_mode = "delete"
sync_mode = "normal"
"#,
    );
    let config = WorkstreamConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.bind_addr().unwrap().port(), 8080);
    assert_eq!(config.server.max_body_bytes, 4096);
    assert_eq!(config.server.auth_mode(), ServerAuthMode::BearerToken);
    assert_eq!(config.server.audit.path.as_deref(), Some("logs/audit.jsonl"));
    assert_eq!(config.store.store_type, StoreType::Sqlite);
    assert_eq!(config.store.busy_timeout_ms, 250);
    assert_eq!(config.store.journal_mode, SqliteStoreMode::Delete);
    assert_eq!(config.store.sync_mode, SqliteSyncMode::Normal);
}

#[test]
fn empty_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let config = WorkstreamConfig::load(Some(&path)).unwrap();
    assert_eq!(config.store.store_type, StoreType::Memory);
    assert_eq!(config.store.journal_mode, SqliteStoreMode::Wal);
    assert_eq!(config.store.sync_mode, SqliteSyncMode::Full);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = WorkstreamConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn malformed_toml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server\nbind = ");
    let result = WorkstreamConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn unknown_store_type_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[store]\ntype = \"postgres\"\n");
    let result = WorkstreamConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn oversized_file_rejected() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("# padding\n");
    contents.push_str(&"#".repeat(1024 * 1024 + 1));
    let path = write_config(&dir, &contents);
    let err = WorkstreamConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("exceeds size limit"));
}

#[test]
fn non_utf8_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workstream.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0xfd]).unwrap();
    let err = WorkstreamConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("utf-8"));
}

#[test]
fn overlong_path_component_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("c".repeat(256));
    let err = WorkstreamConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("component too long"));
}

#[test]
fn invalid_file_fails_validation_on_load() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server]\nbind = \"0.0.0.0:3000\"\n");
    let err = WorkstreamConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

// ============================================================================
// SECTION: Store Section
// ============================================================================

#[test]
fn sqlite_store_requires_path() {
    let config = common::config_from_toml("[store]\ntype = \"sqlite\"\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("sqlite store requires path"));
}

#[test]
fn memory_store_rejects_path() {
    let config =
        common::config_from_toml("[store]\ntype = \"memory\"\npath = \"companies.db\"\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("memory store must not set path"));
}

#[test]
fn sqlite_store_rejects_blank_path() {
    let config = common::config_from_toml("[store]\ntype = \"sqlite\"\npath = \"  \"\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("store.path must be non-empty"));
}
