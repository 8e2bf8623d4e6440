//! The retrieval pipeline: embed → candidate fetch → cognitive re-rank →
//! explain.
//!
//! A query moves through the phases of [`QueryPhase`] and either completes or
//! errors; there are no retries and no partial results. Search reads stored
//! state but never mutates it — recording an access is a separate, explicit
//! operation.

use std::collections::HashMap;
use std::time::Instant;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::config::VaultConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, EngineResult};
use crate::vault::scoring::{self, ScoreBreakdown, ScoreInputs};
use crate::vault::store::fetch_document;
use crate::vault::types::{Document, Tier};
use crate::vault::{embedding_to_bytes, ingest, l2_distance_to_cosine};

/// Pipeline phases, in order. `Errored` is reachable from any of them; the
/// failing phase is recorded in logs for diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Received,
    Embedded,
    CandidatesFetched,
    Reranked,
    Explained,
    Completed,
}

impl QueryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Embedded => "embedded",
            Self::CandidatesFetched => "candidates_fetched",
            Self::Reranked => "reranked",
            Self::Explained => "explained",
            Self::Completed => "completed",
        }
    }
}

fn default_k() -> usize {
    5
}

/// A semantic search request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub user_id: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub min_score: f64,
    #[serde(default)]
    pub tier_filter: Option<String>,
}

/// One ranked search result with its explainable breakdown.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub document_id: String,
    pub rank: usize,
    pub filename: String,
    pub file_type: String,
    pub final_score: f64,
    pub tier: String,
    pub content_snippet: String,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: usize,
    pub query_time_ms: f64,
    pub results: Vec<SearchResult>,
}

/// Run one query through the full pipeline.
pub fn execute(
    conn: &Connection,
    embedder: &dyn EmbeddingProvider,
    req: &SearchRequest,
    config: &VaultConfig,
) -> EngineResult<SearchResponse> {
    let started = Instant::now();

    // 1. Received: validate
    let tier_filter = validate(req, config)?;

    // 2. Embedded
    let query_vec = embedder
        .embed(req.query.trim())
        .map_err(|e| EngineError::Embedding(e.to_string()))?;

    // 3. CandidatesFetched: over-fetch so re-ranking has room to reorder
    let candidate_limit = (req.k * config.retrieval.overfetch_multiplier)
        .min(config.retrieval.candidate_cap);
    let candidates = fetch_candidates(conn, &query_vec, candidate_limit)?;

    // 4. Reranked: cognitive score per candidate, then filter/sort/truncate
    let now = chrono::Utc::now();
    let mut ranked: Vec<(Document, ScoreBreakdown)> = Vec::new();
    for (doc_id, similarity) in candidates {
        let Some(doc) = fetch_document(conn, &doc_id)? else {
            // Vector row outlived its document (pending removal); skip
            continue;
        };
        if doc.user_id != req.user_id {
            continue;
        }

        let breakdown = scoring::breakdown(
            ScoreInputs::for_document(&doc, Some(similarity)),
            now,
            &config.scoring,
            &config.tiers,
        );

        if let Some(tier) = tier_filter {
            if breakdown.tier_enum() != tier {
                continue;
            }
        }
        // min_score applies to the final score, after computation and
        // before truncation to k
        if breakdown.final_score < req.min_score {
            continue;
        }

        ranked.push((doc, breakdown));
    }

    ranked.sort_by(|(doc_a, a), (doc_b, b)| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| doc_b.last_accessed.cmp(&doc_a.last_accessed))
    });
    ranked.truncate(req.k);

    // 5. Explained: attach snippets; ranks are 1-based in final order
    let results: Vec<SearchResult> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (doc, breakdown))| SearchResult {
            document_id: doc.id,
            rank: i + 1,
            filename: doc.filename,
            file_type: doc.file_type,
            final_score: breakdown.final_score,
            tier: breakdown.tier.clone(),
            content_snippet: ingest::preview(
                doc.content_text.as_deref().unwrap_or(""),
                config.retrieval.snippet_chars,
            ),
            breakdown,
        })
        .collect();

    // 6. Completed
    let elapsed_ms = (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;
    tracing::info!(
        query = %req.query,
        phase = QueryPhase::Completed.as_str(),
        total_results = results.len(),
        elapsed_ms,
        "search completed"
    );

    Ok(SearchResponse {
        query: req.query.clone(),
        total_results: results.len(),
        query_time_ms: elapsed_ms,
        results,
    })
}

/// Validate the request; returns the parsed tier filter.
fn validate(req: &SearchRequest, config: &VaultConfig) -> EngineResult<Option<Tier>> {
    if req.query.trim().is_empty() {
        return Err(EngineError::Validation("query cannot be empty".into()));
    }
    if req.k == 0 || req.k > config.retrieval.max_k {
        return Err(EngineError::Validation(format!(
            "k must be between 1 and {}",
            config.retrieval.max_k
        )));
    }
    match req.tier_filter.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<Tier>()
            .map(Some)
            .map_err(EngineError::Validation),
    }
}

/// KNN over chunk vectors, deduplicated to documents keeping the best
/// similarity per document, ordered best-first.
fn fetch_candidates(
    conn: &Connection,
    query_vec: &[f32],
    limit: usize,
) -> EngineResult<Vec<(String, f64)>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, distance FROM chunks_vec WHERE embedding MATCH ?1 \
             ORDER BY distance LIMIT ?2",
        )
        .map_err(|e| EngineError::IndexUnavailable(e.to_string()))?;

    let hits: Vec<(String, f64)> = stmt
        .query_map(params![embedding_to_bytes(query_vec), limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .map_err(|e| EngineError::IndexUnavailable(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EngineError::IndexUnavailable(e.to_string()))?;

    // Chunk hits → best similarity per owning document
    let mut best: HashMap<String, f64> = HashMap::new();
    for (chunk_id, distance) in hits {
        let doc_id: Option<String> = conn
            .query_row(
                "SELECT document_id FROM chunks WHERE id = ?1",
                params![chunk_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(doc_id) = doc_id else { continue };

        let similarity = l2_distance_to_cosine(distance);
        let entry = best.entry(doc_id).or_insert(similarity);
        if similarity > *entry {
            *entry = similarity;
        }
    }

    let mut candidates: Vec<(String, f64)> = best.into_iter().collect();
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(candidates)
}
