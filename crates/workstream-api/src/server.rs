// workstream-api/src/server.rs
// ============================================================================
// Module: Companies API Server
// Description: HTTP server exposing the companies resource.
// Purpose: Map REST requests onto the resource handler and classify outcomes.
// Dependencies: workstream-core, workstream-config, axum, tokio
// ============================================================================

//! ## Overview
//! The API server routes `/companies` requests through header validation and
//! into [`workstream_core::CompaniesResource`]. Resource outcomes map onto
//! status codes: not-found is 404, validation failure is 422, store failures
//! are 500. Every handled request emits one audit event.
//!
//! Store calls are synchronous and run under `block_in_place` when the server
//! is hosted on a multi-threaded runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::extract::ConnectInfo;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use workstream_config::ServerConfig;
use workstream_config::StoreType;
use workstream_config::WorkstreamConfig;
use workstream_core::Clock;
use workstream_core::CompaniesResource;
use workstream_core::CompanyAttributes;
use workstream_core::CompanyId;
use workstream_core::InMemoryCompanyStore;
use workstream_core::ResourceError;
use workstream_core::SharedCompanyStore;
use workstream_store_sqlite::SqliteCompanyStore;
use workstream_store_sqlite::SqliteStoreConfig;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::ApiAuditSink;
use crate::audit::ApiFileAuditSink;
use crate::audit::ApiNoopAuditSink;
use crate::audit::ApiOutcome;
use crate::audit::ApiStderrAuditSink;
use crate::auth::AuthContext;
use crate::auth::DefaultAuthz;
use crate::auth::RequestAuthz;
use crate::auth::RequestContext;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Collection route.
pub const COLLECTION_ROUTE: &str = "/companies";
/// Member route.
pub const MEMBER_ROUTE: &str = "/companies/{id}";
/// Liveness route.
pub const HEALTH_ROUTE: &str = "/health";
/// Optional envelope key wrapping company attributes in request bodies.
const COMPANY_PARAM_KEY: &str = "company";

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        i64::try_from(millis).unwrap_or(i64::MAX)
    }
}

// ============================================================================
// SECTION: API Server
// ============================================================================

/// Companies resource bound to the shared store and system clock.
type CompanyResource = CompaniesResource<SharedCompanyStore, SystemClock>;

/// Companies API server instance.
pub struct ApiServer {
    /// Server configuration.
    config: WorkstreamConfig,
    /// Backing company store.
    store: SharedCompanyStore,
    /// Header validation policy.
    authz: Arc<dyn RequestAuthz>,
    /// Request audit sink.
    audit: Arc<dyn ApiAuditSink>,
}

impl ApiServer {
    /// Builds a new API server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when validation or initialization fails.
    pub fn from_config(config: WorkstreamConfig) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let store = build_company_store(&config)?;
        Self::with_store(config, store)
    }

    /// Builds a new API server over an existing store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when validation or initialization fails.
    pub fn with_store(
        config: WorkstreamConfig,
        store: SharedCompanyStore,
    ) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config.server)?;
        let authz = Arc::new(DefaultAuthz::from_config(config.server.auth.as_ref()));
        Ok(Self {
            config,
            store,
            authz,
            audit,
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn ApiAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkstreamConfig {
        &self.config
    }

    /// Returns the backing company store.
    #[must_use]
    pub const fn store(&self) -> &SharedCompanyStore {
        &self.store
    }

    /// Builds the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::new(self.server_state()))
    }

    /// Binds the configured address and serves requests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ApiServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|_| ApiServerError::Transport("http bind failed".to_string()))?;
        self.serve_on(listener).await
    }

    /// Serves requests on an already-bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when the server fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ApiServerError> {
        let app = self.router();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| ApiServerError::Transport("http server failed".to_string()))
    }

    /// Builds the shared handler state.
    fn server_state(&self) -> ServerState {
        ServerState {
            resource: CompaniesResource::new(self.store.clone(), SystemClock),
            authz: Arc::clone(&self.authz),
            audit: Arc::clone(&self.audit),
            max_body_bytes: self.config.server.max_body_bytes,
        }
    }
}

/// Builds the company store from configuration.
fn build_company_store(config: &WorkstreamConfig) -> Result<SharedCompanyStore, ApiServerError> {
    let store = match config.store.store_type {
        StoreType::Memory => SharedCompanyStore::from_store(InMemoryCompanyStore::new()),
        StoreType::Sqlite => {
            let path = config
                .store
                .path
                .clone()
                .ok_or_else(|| ApiServerError::Config("sqlite store requires path".to_string()))?;
            let sqlite_config = SqliteStoreConfig {
                path,
                busy_timeout_ms: config.store.busy_timeout_ms,
                journal_mode: config.store.journal_mode,
                sync_mode: config.store.sync_mode,
            };
            let store = SqliteCompanyStore::new(&sqlite_config)
                .map_err(|err| ApiServerError::Init(err.to_string()))?;
            SharedCompanyStore::from_store(store)
        }
    };
    Ok(store)
}

/// Builds the audit sink from server configuration.
fn build_audit_sink(server: &ServerConfig) -> Result<Arc<dyn ApiAuditSink>, ApiServerError> {
    if !server.audit.enabled {
        return Ok(Arc::new(ApiNoopAuditSink));
    }
    match server.audit.path.as_deref() {
        Some(path) => {
            let sink = ApiFileAuditSink::new(std::path::Path::new(path.trim()))
                .map_err(|err| ApiServerError::Init(format!("audit log: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(ApiStderrAuditSink)),
    }
}

/// Builds the route table over shared state.
fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(handle_health))
        .route(COLLECTION_ROUTE, get(list_companies).post(create_company))
        .route(
            MEMBER_ROUTE,
            get(show_company).put(update_company).patch(update_company).delete(destroy_company),
        )
        .with_state(state)
}

// ============================================================================
// SECTION: Server State
// ============================================================================

/// Shared server state for HTTP handlers.
struct ServerState {
    /// Companies resource handler.
    resource: CompanyResource,
    /// Header validation policy.
    authz: Arc<dyn RequestAuthz>,
    /// Request audit sink.
    audit: Arc<dyn ApiAuditSink>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

impl ServerState {
    /// Validates request headers.
    fn authenticate(&self, request: &RequestMeta) -> Result<AuthContext, Reply> {
        self.authz.authorize(&request.context).map_err(|_| {
            Reply::error(StatusCode::UNAUTHORIZED, ApiOutcome::Unauthenticated, "unauthenticated")
        })
    }

    /// Records the audit event and renders the response.
    fn finish(
        &self,
        request: RequestMeta,
        subject: Option<String>,
        request_bytes: usize,
        reply: Reply,
    ) -> Response {
        let event = ApiAuditEvent::new(ApiAuditEventParams {
            method: request.method,
            route: request.route,
            company_id: request.company_id,
            status: reply.status.as_u16(),
            outcome: reply.outcome,
            peer_ip: request.context.peer_ip.map(|ip| ip.to_string()),
            subject,
            request_bytes,
            response_bytes: reply.body_len(),
        });
        self.audit.record(&event);
        reply.into_response()
    }
}

/// Request metadata carried into auth and audit.
struct RequestMeta {
    /// HTTP method.
    method: String,
    /// Route template.
    route: &'static str,
    /// Raw company id path segment.
    company_id: Option<String>,
    /// Auth inputs.
    context: RequestContext,
}

impl RequestMeta {
    /// Captures request metadata from the peer and headers.
    fn new(
        method: &Method,
        route: &'static str,
        peer: SocketAddr,
        headers: &HeaderMap,
        company_id: Option<&str>,
    ) -> Self {
        let auth_header =
            headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
        Self {
            method: method.as_str().to_string(),
            route,
            company_id: company_id.map(str::to_string),
            context: RequestContext::http(Some(peer.ip()), auth_header),
        }
    }
}

// ============================================================================
// SECTION: Replies
// ============================================================================

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    /// Human-readable error message.
    message: &'a str,
}

/// Handler outcome prior to rendering.
#[derive(Debug)]
struct Reply {
    /// HTTP status code.
    status: StatusCode,
    /// Classified outcome for auditing.
    outcome: ApiOutcome,
    /// JSON body, or `None` for an empty body.
    body: Option<Vec<u8>>,
}

impl Reply {
    /// Builds a successful JSON reply.
    fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                outcome: ApiOutcome::Ok,
                body: Some(body),
            },
            Err(_) => Self::internal(),
        }
    }

    /// Builds a successful empty reply.
    const fn empty(status: StatusCode) -> Self {
        Self {
            status,
            outcome: ApiOutcome::Ok,
            body: None,
        }
    }

    /// Builds an error reply with a `{"message": ...}` body.
    fn error(status: StatusCode, outcome: ApiOutcome, message: &str) -> Self {
        Self {
            status,
            outcome,
            body: serde_json::to_vec(&ErrorBody {
                message,
            })
            .ok(),
        }
    }

    /// Builds a generic internal error reply.
    fn internal() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, ApiOutcome::Error, "internal error")
    }

    /// Maps a resource failure onto a status code.
    fn from_resource_error(error: &ResourceError) -> Self {
        match error {
            ResourceError::NotFound {
                ..
            } => Self::error(StatusCode::NOT_FOUND, ApiOutcome::NotFound, &error.to_string()),
            ResourceError::ValidationFailed(_) => Self::error(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiOutcome::Invalid,
                &error.to_string(),
            ),
            ResourceError::Store(_) => Self::internal(),
        }
    }

    /// Returns the rendered body size in bytes.
    fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (
                self.status,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body,
            )
                .into_response(),
            None => self.status.into_response(),
        }
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `GET /health`.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(serde_json::json!({ "status": "ok" })))
}

/// Handles `GET /companies`.
async fn list_companies(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let request = RequestMeta::new(&Method::GET, COLLECTION_ROUTE, peer, &headers, None);
    let auth = match state.authenticate(&request) {
        Ok(auth) => auth,
        Err(reply) => return state.finish(request, None, 0, reply),
    };
    let reply = match with_blocking(|| state.resource.list()) {
        Ok(companies) => Reply::json(StatusCode::OK, &companies),
        Err(err) => Reply::from_resource_error(&err),
    };
    state.finish(request, Some(auth.subject), 0, reply)
}

/// Handles `GET /companies/{id}`.
async fn show_company(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Response {
    let request = RequestMeta::new(&Method::GET, MEMBER_ROUTE, peer, &headers, Some(&raw_id));
    let auth = match state.authenticate(&request) {
        Ok(auth) => auth,
        Err(reply) => return state.finish(request, None, 0, reply),
    };
    let reply = match parse_company_id(&raw_id) {
        Err(reply) => reply,
        Ok(id) => match with_blocking(|| state.resource.get(id)) {
            Ok(company) => Reply::json(StatusCode::OK, &company),
            Err(err) => Reply::from_resource_error(&err),
        },
    };
    state.finish(request, Some(auth.subject), 0, reply)
}

/// Handles `POST /companies`.
async fn create_company(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let request = RequestMeta::new(&Method::POST, COLLECTION_ROUTE, peer, &headers, None);
    let auth = match state.authenticate(&request) {
        Ok(auth) => auth,
        Err(reply) => return state.finish(request, None, 0, reply),
    };
    let bytes = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(reply) => return state.finish(request, Some(auth.subject), 0, reply),
    };
    let reply = match parse_attributes(&bytes) {
        Err(reply) => reply,
        Ok(attributes) => {
            match with_blocking(|| state.resource.create(attributes, Some(&auth.subject))) {
                Ok(company) => Reply::json(StatusCode::CREATED, &company),
                Err(err) => Reply::from_resource_error(&err),
            }
        }
    };
    state.finish(request, Some(auth.subject), bytes.len(), reply)
}

/// Handles `PUT /companies/{id}` and `PATCH /companies/{id}`.
async fn update_company(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Body,
) -> Response {
    let request = RequestMeta::new(&method, MEMBER_ROUTE, peer, &headers, Some(&raw_id));
    let auth = match state.authenticate(&request) {
        Ok(auth) => auth,
        Err(reply) => return state.finish(request, None, 0, reply),
    };
    let bytes = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(reply) => return state.finish(request, Some(auth.subject), 0, reply),
    };
    let parsed = parse_company_id(&raw_id)
        .and_then(|id| parse_attributes(&bytes).map(|attributes| (id, attributes)));
    let reply = match parsed {
        Err(reply) => reply,
        Ok((id, attributes)) => match with_blocking(|| state.resource.update(id, &attributes)) {
            Ok(_) => Reply::empty(StatusCode::NO_CONTENT),
            Err(err) => Reply::from_resource_error(&err),
        },
    };
    state.finish(request, Some(auth.subject), bytes.len(), reply)
}

/// Handles `DELETE /companies/{id}`.
async fn destroy_company(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Response {
    let request = RequestMeta::new(&Method::DELETE, MEMBER_ROUTE, peer, &headers, Some(&raw_id));
    let auth = match state.authenticate(&request) {
        Ok(auth) => auth,
        Err(reply) => return state.finish(request, None, 0, reply),
    };
    // Ids that cannot exist are already absent.
    let reply = match CompanyId::parse(&raw_id) {
        None => Reply::empty(StatusCode::NO_CONTENT),
        Some(id) => match with_blocking(|| state.resource.delete(id)) {
            Ok(()) => Reply::empty(StatusCode::NO_CONTENT),
            Err(err) => Reply::from_resource_error(&err),
        },
    };
    state.finish(request, Some(auth.subject), 0, reply)
}

// ============================================================================
// SECTION: Request Helpers
// ============================================================================

/// Runs a store operation, shifting to a blocking context when available.
fn with_blocking<T>(operation: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(operation)
        }
        _ => operation(),
    }
}

/// Reads a request body up to the configured limit.
async fn read_body(body: Body, max_body_bytes: usize) -> Result<Vec<u8>, Reply> {
    to_bytes(body, max_body_bytes).await.map(|bytes| bytes.to_vec()).map_err(|_| {
        Reply::error(StatusCode::PAYLOAD_TOO_LARGE, ApiOutcome::BadRequest, "request body too large")
    })
}

/// Parses a path id; ids that cannot exist are reported as not found.
fn parse_company_id(raw_id: &str) -> Result<CompanyId, Reply> {
    CompanyId::parse(raw_id)
        .ok_or_else(|| Reply::from_resource_error(&ResourceError::not_found(raw_id)))
}

/// Parses company attributes from a JSON body.
///
/// An empty body is an empty attribute set. Attributes may be sent bare or
/// wrapped in a `{"company": {...}}` envelope.
fn parse_attributes(bytes: &[u8]) -> Result<CompanyAttributes, Reply> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(CompanyAttributes::default());
    }
    let value: Value = serde_json::from_slice(bytes).map_err(|_| invalid_json())?;
    let Value::Object(mut fields) = value else {
        return Err(invalid_json());
    };
    let attributes = match fields.remove(COMPANY_PARAM_KEY) {
        Some(Value::Object(inner)) => inner,
        Some(other) => {
            fields.insert(COMPANY_PARAM_KEY.to_string(), other);
            fields
        }
        None => fields,
    };
    serde_json::from_value(Value::Object(attributes)).map_err(|_| invalid_json())
}

/// Builds the malformed-body reply.
fn invalid_json() -> Reply {
    Reply::error(StatusCode::BAD_REQUEST, ApiOutcome::BadRequest, "invalid json body")
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
