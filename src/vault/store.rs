//! Document store reads and the deletion write path.
//!
//! Deletion runs as one transaction: chunk ids are queued into the
//! `index_removals` table, the document row is deleted (chunks cascade via
//! FK), and its access events are pruned. After commit the removal queue is
//! flushed against the vector table; a failed flush leaves the queue intact
//! for the next sweep, so index removal converges at-least-once while the
//! document is already gone from every listing.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{EngineError, EngineResult};
use crate::vault::types::{Document, DocumentSummary, Tier};

const DOCUMENT_COLUMNS: &str = "id, user_id, filename, file_type, file_size, chunk_count, \
     description, content_text, tier, cognitive_score, semantic_score, access_count, \
     last_accessed, created_at";

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        file_type: row.get(3)?,
        file_size: row.get::<_, i64>(4)? as u64,
        chunk_count: row.get(5)?,
        description: row.get(6)?,
        content_text: row.get(7)?,
        tier: row.get(8)?,
        cognitive_score: row.get(9)?,
        semantic_score: row.get(10)?,
        access_count: row.get(11)?,
        last_accessed: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Fetch a document by id, or `None` when absent.
pub fn fetch_document(conn: &Connection, doc_id: &str) -> EngineResult<Option<Document>> {
    let doc = conn
        .query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
            params![doc_id],
            document_from_row,
        )
        .optional()?;
    Ok(doc)
}

/// Fetch a document by id, failing with NotFound when absent.
pub fn get_document(conn: &Connection, doc_id: &str) -> EngineResult<Document> {
    fetch_document(conn, doc_id)?.ok_or_else(|| EngineError::NotFound(doc_id.to_string()))
}

/// List an owner's documents, optionally filtered by tier, ordered by
/// cognitive score descending, paginated with skip/limit.
pub fn list_documents(
    conn: &Connection,
    user_id: &str,
    tier: Option<Tier>,
    skip: u32,
    limit: u32,
) -> EngineResult<Vec<DocumentSummary>> {
    let rows: Vec<Document> = if let Some(t) = tier {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = ?1 AND tier = ?2 \
             ORDER BY cognitive_score DESC LIMIT ?3 OFFSET ?4"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id, t.as_str(), limit, skip], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    } else {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = ?1 \
             ORDER BY cognitive_score DESC LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id, limit, skip], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    Ok(rows.iter().map(Document::summary).collect())
}

/// All documents for an owner, unpaginated. Used by analytics.
pub fn all_documents(conn: &Connection, user_id: &str) -> EngineResult<Vec<Document>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = ?1"
    ))?;
    let rows = stmt
        .query_map(params![user_id], document_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Delete a document, its chunks, and its access events; queue and flush
/// vector-index removals. Returns NotFound for unknown ids or a mismatched
/// owner.
pub fn delete_document(
    conn: &mut Connection,
    doc_id: &str,
    user_id: Option<&str>,
) -> EngineResult<()> {
    let tx = conn.transaction()?;

    let owner: Option<String> = tx
        .query_row(
            "SELECT user_id FROM documents WHERE id = ?1",
            params![doc_id],
            |row| row.get(0),
        )
        .optional()?;
    let owner = owner.ok_or_else(|| EngineError::NotFound(doc_id.to_string()))?;
    if let Some(uid) = user_id {
        if owner != uid {
            return Err(EngineError::NotFound(doc_id.to_string()));
        }
    }

    // Queue every chunk vector for removal before the rows disappear
    let now = Utc::now().to_rfc3339();
    tx.execute(
        "INSERT OR IGNORE INTO index_removals (chunk_id, document_id, queued_at) \
         SELECT id, document_id, ?1 FROM chunks WHERE document_id = ?2",
        params![now, doc_id],
    )?;

    tx.execute(
        "DELETE FROM access_events WHERE document_id = ?1",
        params![doc_id],
    )?;
    // Chunks cascade via FK
    tx.execute("DELETE FROM documents WHERE id = ?1", params![doc_id])?;

    tx.commit()?;

    // Best-effort immediate flush; the queue persists across failures
    match flush_index_removals(conn) {
        Ok(flushed) => {
            tracing::info!(id = %doc_id, vectors_removed = flushed, "document deleted");
        }
        Err(e) => {
            tracing::warn!(id = %doc_id, error = %e, "index removal deferred, queue retained");
        }
    }

    Ok(())
}

/// Remove every queued chunk vector from the index. Idempotent by chunk id;
/// safe to call repeatedly until the queue drains.
pub fn flush_index_removals(conn: &mut Connection) -> EngineResult<usize> {
    let tx = conn.transaction()?;

    let pending: Vec<String> = {
        let mut stmt = tx.prepare("SELECT chunk_id FROM index_removals")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    for chunk_id in &pending {
        tx.execute("DELETE FROM chunks_vec WHERE id = ?1", params![chunk_id])
            .map_err(|e| EngineError::IndexUnavailable(e.to_string()))?;
        tx.execute(
            "DELETE FROM index_removals WHERE chunk_id = ?1",
            params![chunk_id],
        )?;
    }

    tx.commit()?;
    Ok(pending.len())
}

/// Number of vector removals still awaiting confirmation.
pub fn pending_index_removals(conn: &Connection) -> EngineResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM index_removals", [], |row| row.get(0))?;
    Ok(count as u64)
}
