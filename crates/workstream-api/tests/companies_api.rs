// workstream-api/tests/companies_api.rs
// ============================================================================
// Module: Companies API Integration Tests
// Description: End-to-end HTTP tests for the companies resource.
// Purpose: Exercise routing, status codes, and bodies over a real socket.
// Dependencies: workstream-api, reqwest, tokio
// ============================================================================

//! ## Overview
//! Starts the API server on an ephemeral loopback port and drives it with an
//! HTTP client. Ten companies are seeded before each server starts.

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

use std::error::Error;
use std::sync::Arc;

use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use workstream_api::ApiNoopAuditSink;
use workstream_api::ApiServer;
use workstream_api::WorkstreamConfig;
use workstream_config::ServerAuthConfig;
use workstream_config::ServerAuthMode;
use workstream_config::StoreType;
use workstream_core::CompanyStore;
use workstream_core::InMemoryCompanyStore;
use workstream_core::NewCompany;
use workstream_core::SharedCompanyStore;

type TestResult = Result<(), Box<dyn Error>>;

const SEEDED_COMPANIES: usize = 10;

// ============================================================================
// SECTION: Helpers
// ============================================================================

struct RunningServer {
    base_url: String,
    client: Client,
}

impl RunningServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn seed(store: &SharedCompanyStore) -> Result<(), Box<dyn Error>> {
    for index in 0 .. SEEDED_COMPANIES {
        store.insert(NewCompany {
            name: format!("Company {index}"),
            created_by: Some("1".to_string()),
            created_at: 1_700_000_000_000,
        })?;
    }
    Ok(())
}

async fn start(server: ApiServer) -> Result<RunningServer, Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(server.serve_on(listener));
    Ok(RunningServer {
        base_url: format!("http://{addr}"),
        client: Client::new(),
    })
}

async fn start_seeded(config: WorkstreamConfig) -> Result<RunningServer, Box<dyn Error>> {
    let store = SharedCompanyStore::from_store(InMemoryCompanyStore::new());
    seed(&store)?;
    let server = ApiServer::with_store(config, store)?.with_audit_sink(Arc::new(ApiNoopAuditSink));
    start(server).await
}

// ============================================================================
// SECTION: Companies Resource
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn index_lists_every_company() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server.client.get(server.url("/companies")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let items = body.as_array().ok_or("expected array")?;
    assert_eq!(items.len(), SEEDED_COMPANIES);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn show_returns_company_with_requested_id() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let listed: Value = server.client.get(server.url("/companies")).send().await?.json().await?;
    let id = listed[0]["id"].as_u64().ok_or("expected id")?;

    let response = server.client.get(server.url(&format!("/companies/{id}"))).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["id"].as_u64(), Some(id));
    assert_eq!(body["name"], listed[0]["name"]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn show_unknown_company_is_not_found() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server.client.get(server.url("/companies/100")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.text().await?;
    assert!(body.contains("Couldn't find Company"), "{body}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_name_is_created() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server
        .client
        .post(server.url("/companies"))
        .json(&json!({ "name": "Workstream" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["name"], "Workstream");
    assert_eq!(body["id"].as_u64(), Some(11));

    let listed: Value = server.client.get(server.url("/companies")).send().await?.json().await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(SEEDED_COMPANIES + 1));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn create_without_name_is_unprocessable() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server.client.post(server.url("/companies")).json(&json!({})).send().await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await?;
    assert!(body.contains("Validation failed: Name can't be blank"), "{body}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn update_returns_no_content_and_persists() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server
        .client
        .put(server.url("/companies/1"))
        .json(&json!({ "name": "Soup Spoon" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.text().await?.is_empty());

    let body: Value = server.client.get(server.url("/companies/1")).send().await?.json().await?;
    assert_eq!(body["name"], "Soup Spoon");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn destroy_returns_no_content_and_removes() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server.client.delete(server.url("/companies/1")).send().await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server.client.get(server.url("/companies/1")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = server.client.delete(server.url("/companies/1")).send().await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_route_is_not_found() -> TestResult {
    let server = start_seeded(WorkstreamConfig::default()).await?;
    let response = server.client.get(server.url("/users")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = server.client.post(server.url("/companies/1")).send().await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

// ============================================================================
// SECTION: Auth
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn bearer_mode_requires_token() -> TestResult {
    let mut config = WorkstreamConfig::default();
    config.server.auth = Some(ServerAuthConfig {
        mode: ServerAuthMode::BearerToken,
        bearer_tokens: vec!["integration-token".to_string()],
    });
    let server = start_seeded(config).await?;

    let response = server.client.get(server.url("/companies")).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .client
        .get(server.url("/companies"))
        .bearer_auth("integration-token")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.client.get(server.url("/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

// ============================================================================
// SECTION: Durable Store
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn sqlite_store_survives_restart() -> TestResult {
    let dir = tempfile::TempDir::new()?;
    let mut config = WorkstreamConfig::default();
    config.store.store_type = StoreType::Sqlite;
    config.store.path = Some(dir.path().join("companies.db"));
    config.server.audit.enabled = false;

    let first = start(ApiServer::from_config(config.clone())?).await?;
    let response = first
        .client
        .post(first.url("/companies"))
        .json(&json!({ "name": "Workstream" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let second = ApiServer::from_config(config)?;
    let stored = second.store().list()?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Workstream");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_name_is_unprocessable_on_every_backend() -> TestResult {
    let dir = tempfile::TempDir::new()?;
    let name = "x".repeat(2 * 1024 * 1024);
    for store_type in [StoreType::Memory, StoreType::Sqlite] {
        let mut config = WorkstreamConfig::default();
        config.server.max_body_bytes = 4 * 1024 * 1024;
        config.server.audit.enabled = false;
        if store_type == StoreType::Sqlite {
            config.store.path = Some(dir.path().join("companies.db"));
        }
        config.store.store_type = store_type;
        let server = start(ApiServer::from_config(config)?).await?;

        let response = server
            .client
            .post(server.url("/companies"))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json().await?;
        assert_eq!(body["message"], "Validation failed: Name is too long");

        let created = server
            .client
            .post(server.url("/companies"))
            .json(&json!({ "name": "Workstream" }))
            .send()
            .await?;
        assert_eq!(created.status(), StatusCode::CREATED);
        let response = server
            .client
            .put(server.url("/companies/1"))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(())
}
