//! Ingestion write path — chunking and transactional document creation.
//!
//! [`ingest_document`] inserts the document row, every chunk row, and every
//! chunk vector inside one transaction, so a document is either fully
//! searchable or absent. Partial ingestion never survives.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::config::{ScoringConfig, TierConfig};
use crate::error::{EngineError, EngineResult};
use crate::vault::embedding_to_bytes;
use crate::vault::scoring::{self, ScoreInputs};
use crate::vault::types::{DocumentSummary, FileType};

/// Words per chunk and overlap between consecutive chunks.
pub const CHUNK_SIZE_WORDS: usize = 512;
pub const CHUNK_OVERLAP_WORDS: usize = 64;

/// A document upload after text extraction, ready to ingest.
#[derive(Debug)]
pub struct NewDocument<'a> {
    pub user_id: &'a str,
    pub filename: &'a str,
    pub description: Option<&'a str>,
    pub file_size: u64,
    pub text: &'a str,
}

/// Split text into overlapping word-count chunks.
///
/// Returns an empty vec for whitespace-only input; callers substitute a
/// placeholder chunk so every document carries at least one chunk.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end >= words.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Whitespace-collapsed preview of document text, truncated with an ellipsis.
pub fn preview(text: &str, max_chars: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= max_chars {
        cleaned
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}

/// Create a document with its chunks and vectors in one transaction.
///
/// `chunks` and `embeddings` must be parallel and non-empty. The initial
/// cognitive score is computed with no semantic signal (never queried → 0),
/// so fresh documents start from their recency component alone.
pub fn ingest_document(
    conn: &mut Connection,
    doc: NewDocument<'_>,
    chunks: &[String],
    embeddings: &[Vec<f32>],
    now: DateTime<Utc>,
    scoring_cfg: &ScoringConfig,
    tier_cfg: &TierConfig,
) -> EngineResult<DocumentSummary> {
    if chunks.is_empty() {
        return Err(EngineError::Validation(
            "document must produce at least one chunk".into(),
        ));
    }
    if chunks.len() != embeddings.len() {
        return Err(EngineError::Embedding(format!(
            "got {} embeddings for {} chunks",
            embeddings.len(),
            chunks.len()
        )));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let created_at = now.to_rfc3339();
    let file_type = FileType::from_filename(doc.filename);

    let initial = scoring::breakdown(
        ScoreInputs {
            semantic_similarity: 0.0,
            access_count: 0,
            last_accessed: None,
            created_at: &created_at,
        },
        now,
        scoring_cfg,
        tier_cfg,
    );

    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO documents (id, user_id, filename, file_type, file_size, chunk_count, \
         description, content_text, tier, cognitive_score, semantic_score, access_count, \
         last_accessed, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0.0, 0, NULL, ?11)",
        params![
            id,
            doc.user_id,
            doc.filename,
            file_type.as_str(),
            doc.file_size as i64,
            chunks.len() as u32,
            doc.description,
            doc.text,
            initial.tier,
            initial.final_score,
            created_at,
        ],
    )?;

    for (seq, (content, embedding)) in chunks.iter().zip(embeddings).enumerate() {
        let chunk_id = uuid::Uuid::now_v7().to_string();
        tx.execute(
            "INSERT INTO chunks (id, document_id, seq, content) VALUES (?1, ?2, ?3, ?4)",
            params![chunk_id, id, seq as u32, content],
        )?;
        // Index insertion participates in the same transaction: a failure
        // here rolls the whole document back.
        tx.execute(
            "INSERT INTO chunks_vec (id, embedding) VALUES (?1, ?2)",
            params![chunk_id, embedding_to_bytes(embedding)],
        )
        .map_err(|e| EngineError::IndexUnavailable(e.to_string()))?;
    }

    tx.commit()?;

    tracing::info!(
        id = %id,
        filename = %doc.filename,
        chunks = chunks.len(),
        tier = %initial.tier,
        "document ingested"
    );

    Ok(DocumentSummary {
        id,
        user_id: doc.user_id.to_string(),
        filename: doc.filename.to_string(),
        file_type: file_type.as_str().to_string(),
        tier: initial.tier,
        cognitive_score: initial.final_score,
        semantic_score: 0.0,
        access_count: 0,
        last_accessed: None,
        created_at,
        chunk_count: chunks.len() as u32,
        file_size: doc.file_size,
        description: doc.description.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_covers_all_words_with_overlap() {
        let words: Vec<String> = (0..1000).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk_text(&text, 512, 64);

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].starts_with("w0 "));
        // Second chunk starts one step (512-64=448) in
        assert!(chunks[1].starts_with("w448 "));
        assert!(chunks[2].ends_with("w999"));
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = chunk_text("just a few words", 512, 64);
        assert_eq!(chunks, vec!["just a few words".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 512, 64).is_empty());
        assert!(chunk_text("   \n\t ", 512, 64).is_empty());
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        assert_eq!(preview("hello   world\n\nagain", 100), "hello world again");
        let long = "word ".repeat(100);
        let p = preview(&long, 20);
        assert_eq!(p.chars().count(), 21); // 20 chars + ellipsis
        assert!(p.ends_with('…'));
    }
}
