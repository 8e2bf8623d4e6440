//! Semantic search endpoint.

use axum::extract::State;
use axum::Json;

use crate::vault::search::{self, SearchRequest, SearchResponse};

use super::{AppError, AppState};

/// `POST /api/search/` — run one query through the retrieval pipeline.
/// Searching never mutates stored scores; accesses are recorded separately.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let embedder = state.embedding.clone();
    let config = state.config.clone();
    let db = state.db.clone();

    let response = tokio::task::spawn_blocking(move || {
        let conn = db.blocking_lock();
        search::execute(&conn, embedder.as_ref(), &req, &config)
    })
    .await??;

    Ok(Json(response))
}
