//! Usage tracking — the only read-adjacent path that mutates a document.
//!
//! [`record_access`] appends one append-only access event, bumps the access
//! counter with a relative SQL increment (so concurrent recordings never lose
//! an update), and synchronously recomputes and persists the cognitive
//! score/tier. Plain reads never come through here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::config::{ScoringConfig, TierConfig};
use crate::error::{EngineError, EngineResult};
use crate::vault::scoring::{self, ScoreInputs};
use crate::vault::store::get_document;
use crate::vault::types::DocumentSummary;

/// Response from an access recording: the ack fields the front-end reads
/// plus the full updated summary.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub status: String,
    pub cognitive_score: f64,
    pub tier: String,
    #[serde(flatten)]
    pub document: DocumentSummary,
}

/// Record one access: append the event, increment the counter, recompute and
/// persist score/tier. Each call is a real usage signal — N calls record N
/// distinct events by design.
pub fn record_access(
    conn: &mut Connection,
    doc_id: &str,
    query_used: Option<&str>,
    relevance_score: Option<f64>,
    now: DateTime<Utc>,
    scoring_cfg: &ScoringConfig,
    tier_cfg: &TierConfig,
) -> EngineResult<AccessResponse> {
    let now_str = now.to_rfc3339();

    let tx = conn.transaction()?;

    let exists: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM documents WHERE id = ?1",
            params![doc_id],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(EngineError::NotFound(doc_id.to_string()));
    }

    // 1. Append the event
    tx.execute(
        "INSERT INTO access_events (document_id, accessed_at, query_used, relevance_score) \
         VALUES (?1, ?2, ?3, ?4)",
        params![doc_id, now_str, query_used, relevance_score],
    )?;

    // 2. Relative increment — never lost under concurrent recordings
    tx.execute(
        "UPDATE documents SET access_count = access_count + 1, last_accessed = ?1 WHERE id = ?2",
        params![now_str, doc_id],
    )?;

    // 3. Recompute with the fresh counters; relevance (when supplied)
    //    becomes the new semantic component
    let (access_count, semantic_score, created_at): (u32, f64, String) = tx.query_row(
        "SELECT access_count, semantic_score, created_at FROM documents WHERE id = ?1",
        params![doc_id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let semantic = relevance_score.unwrap_or(semantic_score);
    let breakdown = scoring::breakdown(
        ScoreInputs {
            semantic_similarity: semantic,
            access_count,
            last_accessed: Some(&now_str),
            created_at: &created_at,
        },
        now,
        scoring_cfg,
        tier_cfg,
    );

    // 4. Persist the new cognitive state
    tx.execute(
        "UPDATE documents SET cognitive_score = ?1, tier = ?2, semantic_score = ?3 WHERE id = ?4",
        params![
            breakdown.final_score,
            breakdown.tier,
            breakdown.semantic_similarity,
            doc_id
        ],
    )?;

    tx.commit()?;

    tracing::debug!(
        id = %doc_id,
        access_count,
        score = breakdown.final_score,
        tier = %breakdown.tier,
        "access recorded"
    );

    let document = get_document(conn, doc_id)?.summary();
    Ok(AccessResponse {
        status: "ok".to_string(),
        cognitive_score: breakdown.final_score,
        tier: breakdown.tier,
        document,
    })
}
