#![allow(dead_code)]

use chrono::Utc;
use rusqlite::Connection;

use neurovault::config::VaultConfig;
use neurovault::db;
use neurovault::embedding::{self, EmbeddingProvider};
use neurovault::vault::ingest::{self, NewDocument};
use neurovault::vault::types::DocumentSummary;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

pub fn test_config() -> VaultConfig {
    VaultConfig::default()
}

/// The deterministic feature-hash provider from the default config.
pub fn test_provider() -> Box<dyn EmbeddingProvider> {
    embedding::create_provider(&test_config().embedding).unwrap()
}

/// Generate a deterministic 384-dim unit embedding with a spike at `seed`.
/// Distinct seeds produce orthogonal vectors.
pub fn spike_embedding(seed: u8) -> Vec<f32> {
    let mut v = vec![0.0f32; 384];
    v[seed as usize % 384] = 1.0;
    v
}

/// Ingest a single-chunk document with an explicit embedding. Returns the
/// stored summary.
pub fn insert_document(
    conn: &mut Connection,
    user_id: &str,
    filename: &str,
    text: &str,
    embedding: Vec<f32>,
) -> DocumentSummary {
    let config = test_config();
    ingest::ingest_document(
        conn,
        NewDocument {
            user_id,
            filename,
            description: None,
            file_size: text.len() as u64,
            text,
        },
        &[text.to_string()],
        &[embedding],
        Utc::now(),
        &config.scoring,
        &config.tiers,
    )
    .unwrap()
}

/// Ingest a document whose chunk embedding comes from the hash provider, so
/// vocabulary-overlapping queries find it.
pub fn insert_text_document(
    conn: &mut Connection,
    provider: &dyn EmbeddingProvider,
    user_id: &str,
    filename: &str,
    text: &str,
) -> DocumentSummary {
    let embedding = provider.embed(text).unwrap();
    insert_document(conn, user_id, filename, text, embedding)
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
