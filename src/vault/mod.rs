pub mod access;
pub mod analytics;
pub mod ingest;
pub mod scoring;
pub mod search;
pub mod store;
pub mod types;

use chrono::{DateTime, Utc};

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Convert a vec0 L2 distance between unit vectors to cosine similarity,
/// clamped to `[0, 1]`: `cos = 1 - d²/2`.
pub fn l2_distance_to_cosine(distance: f64) -> f64 {
    (1.0 - (distance * distance) / 2.0).clamp(0.0, 1.0)
}

/// Parse a stored RFC 3339 timestamp, treating unparseable values as the
/// UNIX epoch so a corrupt row degrades to "very stale" instead of an error.
pub fn parse_timestamp(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_cosine_one() {
        assert_eq!(l2_distance_to_cosine(0.0), 1.0);
    }

    #[test]
    fn orthogonal_unit_vectors_have_cosine_zero() {
        // ||a - b||² = 2 for orthogonal unit vectors
        let d = 2.0_f64.sqrt();
        assert!(l2_distance_to_cosine(d).abs() < 1e-12);
    }

    #[test]
    fn opposite_vectors_clamp_to_zero() {
        assert_eq!(l2_distance_to_cosine(2.0), 0.0);
    }

    #[test]
    fn bad_timestamp_parses_to_epoch() {
        assert_eq!(parse_timestamp("not-a-date"), DateTime::<Utc>::UNIX_EPOCH);
    }
}
