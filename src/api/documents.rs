//! Document endpoints: upload, list, detail, delete, access recording.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::EngineError;
use crate::vault::access::{self, AccessResponse};
use crate::vault::ingest::{self, NewDocument, CHUNK_OVERLAP_WORDS, CHUNK_SIZE_WORDS};
use crate::vault::scoring::{self, ScoreBreakdown, ScoreInputs};
use crate::vault::store;
use crate::vault::types::{DocumentSummary, Tier};

use super::{default_user, with_db, AppError, AppState};

const MAX_LIST_LIMIT: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    #[serde(default = "default_user")]
    pub user_id: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /api/documents/upload` — multipart `file` field.
///
/// Upload pipeline: decode → chunk → embed → store, with the store step
/// committing document, chunks, and vectors atomically.
pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<DocumentSummary>, AppError> {
    let mut filename = None;
    let mut bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EngineError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(str::to_string);
            bytes = Some(field.bytes().await.map_err(|e| {
                EngineError::Validation(format!("failed to read upload: {e}"))
            })?);
            break;
        }
    }

    let bytes = bytes.ok_or_else(|| {
        AppError::from(EngineError::Validation("missing multipart field: file".into()))
    })?;
    let filename = filename.unwrap_or_else(|| "upload.txt".to_string());
    let file_size = bytes.len() as u64;

    // Text extraction is boundary work; uploads are treated as UTF-8 text
    // and a placeholder body stands in when nothing decodable survives.
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.trim().is_empty() {
        text = format!("[No text extracted from {filename}]");
    }

    let embedder = state.embedding.clone();
    let config = state.config.clone();
    let db = state.db.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let chunks = ingest::chunk_text(&text, CHUNK_SIZE_WORDS, CHUNK_OVERLAP_WORDS);
        let chunk_refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = embedder
            .embed_batch(&chunk_refs)
            .map_err(|e| EngineError::Embedding(e.to_string()))?;

        let mut conn = db.blocking_lock();
        ingest::ingest_document(
            &mut conn,
            NewDocument {
                user_id: &params.user_id,
                filename: &filename,
                description: if params.description.is_empty() {
                    None
                } else {
                    Some(params.description.as_str())
                },
                file_size,
                text: &text,
            },
            &chunks,
            &embeddings,
            Utc::now(),
            &config.scoring,
            &config.tiers,
        )
    })
    .await??;

    Ok(Json(summary))
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_user")]
    pub user_id: String,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// `GET /api/documents/` — owner's documents, best score first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    let tier = match params.tier.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            s.parse::<Tier>()
                .map_err(EngineError::Validation)
                .map_err(AppError::from)?,
        ),
    };
    let limit = params.limit.min(MAX_LIST_LIMIT);

    let docs = with_db(&state, move |conn| {
        store::list_documents(conn, &params.user_id, tier, params.skip, limit)
    })
    .await?;
    Ok(Json(docs))
}

#[derive(Debug, serde::Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: DocumentSummary,
    pub content_preview: String,
    pub explanation: ScoreBreakdown,
}

/// `GET /api/documents/{doc_id}` — summary plus preview and the current
/// score breakdown. Reads never count as accesses.
pub async fn detail(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocumentDetail>, AppError> {
    let config = state.config.clone();
    let detail = with_db(&state, move |conn| {
        let doc = store::get_document(conn, &doc_id)?;
        let explanation = scoring::breakdown(
            ScoreInputs::for_document(&doc, None),
            Utc::now(),
            &config.scoring,
            &config.tiers,
        );
        let content_preview = ingest::preview(
            doc.content_text.as_deref().unwrap_or(""),
            config.retrieval.snippet_chars,
        );
        Ok(DocumentDetail {
            document: doc.summary(),
            content_preview,
            explanation,
        })
    })
    .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default = "default_user")]
    pub user_id: String,
}

/// `DELETE /api/documents/{doc_id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = doc_id.clone();
    with_db(&state, move |conn| {
        store::delete_document(conn, &id, Some(&params.user_id))
    })
    .await?;
    Ok(Json(json!({ "status": "deleted", "doc_id": doc_id })))
}

#[derive(Debug, Deserialize)]
pub struct AccessParams {
    #[serde(default)]
    pub query_used: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

/// `POST /api/documents/{doc_id}/access` — the explicit usage signal.
pub async fn access(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Query(params): Query<AccessParams>,
) -> Result<Json<AccessResponse>, AppError> {
    let config = state.config.clone();
    let response = with_db(&state, move |conn| {
        access::record_access(
            conn,
            &doc_id,
            params.query_used.as_deref(),
            params.relevance_score,
            Utc::now(),
            &config.scoring,
            &config.tiers,
        )
    })
    .await?;
    Ok(Json(response))
}
