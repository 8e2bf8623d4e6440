//! Engine error taxonomy.
//!
//! Every fallible engine operation returns [`EngineError`]. The HTTP layer maps
//! each variant to a status code in one place (`api::AppError`), so handlers
//! never invent their own classification.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller-supplied input is invalid (empty query, out-of-range k,
    /// unknown tier). Never retried.
    #[error("{0}")]
    Validation(String),

    /// The referenced document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Query embedding failed. Safe for the caller to retry.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The vector index could not serve a lookup. Safe for the caller to retry.
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// A concurrent mutation could not be resolved after retries.
    #[error("conflicting update on document {0}")]
    Conflict(String),

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Machine-readable error code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Embedding(_) => "embedding_failure",
            Self::IndexUnavailable(_) => "index_unavailable",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage_error",
        }
    }
}
