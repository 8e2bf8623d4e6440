//! REST surface consumed by the NeuroVault front-end.
//!
//! All routes live under `/api` except `/health`. Handlers are thin: they
//! parse the request, run the engine call in `spawn_blocking` against the
//! shared connection, and serialize the result. Error classification happens
//! once, in [`AppError`].

pub mod analytics;
pub mod documents;
pub mod search;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::config::VaultConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, EngineResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub embedding: Arc<dyn EmbeddingProvider>,
    pub config: Arc<VaultConfig>,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/documents/upload", post(documents::upload))
        .route("/api/documents", get(documents::list))
        .route("/api/documents/", get(documents::list))
        .route(
            "/api/documents/{doc_id}",
            get(documents::detail).delete(documents::delete),
        )
        .route("/api/documents/{doc_id}/access", post(documents::access))
        .route("/api/search", post(search::search))
        .route("/api/search/", post(search::search))
        .route("/api/analytics", get(analytics::overview))
        .route("/api/analytics/", get(analytics::overview))
        .route("/api/analytics/lifecycle", get(analytics::lifecycle))
        .route("/api/analytics/tiers", get(analytics::tiers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "neurovault",
        "version": env!("CARGO_PKG_VERSION"),
        "embedding_provider": state.config.embedding.provider,
    }))
}

/// HTTP-facing error wrapper. Engine errors map to statuses here and nowhere
/// else; anything outside the engine taxonomy is a 500.
#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("worker task failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Engine(err) => {
                let status = match err {
                    EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                    EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::Conflict(_) => StatusCode::CONFLICT,
                    EngineError::Embedding(_) | EngineError::IndexUnavailable(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code(), err.to_string())
            }
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message.clone(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }

        let body = json!({ "error": { "code": code, "message": message } });
        (status, Json(body)).into_response()
    }
}

/// Run a blocking engine call against the shared connection.
pub(crate) async fn with_db<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> EngineResult<T> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    let result = tokio::task::spawn_blocking(move || {
        let mut conn = db.blocking_lock();
        f(&mut conn)
    })
    .await?;
    result.map_err(AppError::from)
}

pub(crate) fn default_user() -> String {
    "default_user".to_string()
}
