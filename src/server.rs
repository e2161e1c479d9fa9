//! JSON HTTP API.
//!
//! Exposes the vectorization session over HTTP for frontends and
//! LLM-calling services.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/repository/process` | Vectorize a flattened dump, replacing the live index |
//! | `POST` | `/repository/query` | Query the live index (optionally rebuilding first) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses use the shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `embedding_unavailable` (503),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::embedding::EmbeddingError;
use crate::pipeline::{ProcessSummary, QueryResponse, RepoSession};

/// Shared state: one session guarded by a lock so the index is always
/// fully populated by a single writer before readers see it.
#[derive(Clone)]
struct AppState {
    session: Arc<RwLock<RepoSession>>,
}

/// Start the HTTP server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let session = RepoSession::new(config)?;
    let state = AppState {
        session: Arc::new(RwLock::new(session)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/repository/process", post(handle_process))
        .route("/repository/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("repolens server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Map pipeline failures to HTTP responses. Embedding-backend
/// unavailability is distinguishable from other internal errors so
/// callers can decide their own fallback.
fn classify_error(err: anyhow::Error) -> AppError {
    if let Some(embedding_err) = err.downcast_ref::<EmbeddingError>() {
        let status = match embedding_err {
            EmbeddingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
        return AppError {
            status,
            code: "embedding_unavailable".to_string(),
            message: err.to_string(),
        };
    }

    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /repository/process ============

#[derive(Deserialize)]
struct ProcessRequest {
    repo_text: String,
}

async fn handle_process(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessSummary>, AppError> {
    if req.repo_text.trim().is_empty() {
        return Err(bad_request("repo_text must not be empty"));
    }

    let mut session = state.session.write().await;
    let summary = session
        .process_repository(&req.repo_text)
        .await
        .map_err(classify_error)?;

    Ok(Json(summary))
}

// ============ POST /repository/query ============

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
    repo_text: Option<String>,
    #[serde(default)]
    include_full_content: bool,
}

async fn handle_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    // Write lock: the query may carry a blob that rebuilds the index.
    let mut session = state.session.write().await;
    let response = session
        .query_repository(&req.query, req.repo_text.as_deref(), req.include_full_content)
        .await
        .map_err(classify_error)?;

    Ok(Json(response))
}
