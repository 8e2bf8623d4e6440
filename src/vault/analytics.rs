//! Vault analytics — aggregations over the stored cognitive state.
//!
//! All three views report the scores and tiers as persisted, without
//! recomputing decay; they describe the vault as the write paths last left it.

use rusqlite::Connection;
use serde::Serialize;

use crate::config::TierConfig;
use crate::error::EngineResult;
use crate::vault::store::all_documents;
use crate::vault::types::{Document, DocumentSummary, Tier, TIER_ORDER};

const HISTOGRAM_BUCKETS: usize = 10;
const TOP_DOCUMENTS: usize = 10;

#[derive(Debug, Serialize)]
pub struct TierSlice {
    pub tier: String,
    pub count: usize,
    pub avg_score: f64,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_documents: usize,
    pub avg_cognitive_score: f64,
    pub tier_distribution: Vec<TierSlice>,
    pub top_documents: Vec<DocumentSummary>,
}

#[derive(Debug, Serialize)]
pub struct LifecycleNode {
    pub id: String,
    pub filename: String,
    pub score: f64,
    pub tier: String,
    pub access_count: u32,
    pub file_type: String,
    pub color: String,
    pub created_at: String,
    pub last_accessed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistogramBucket {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TierThresholds {
    pub active: f64,
    pub contextual: f64,
    pub archived: f64,
}

#[derive(Debug, Serialize)]
pub struct Lifecycle {
    pub nodes: Vec<LifecycleNode>,
    pub histogram: Vec<HistogramBucket>,
    pub tier_thresholds: TierThresholds,
}

#[derive(Debug, Serialize)]
pub struct TierDetail {
    pub count: usize,
    pub avg_score: f64,
    pub color: String,
    pub description: String,
}

/// Vault-level summary: totals, per-tier distribution, top documents.
///
/// Tiers with no documents are omitted from the distribution; an empty vault
/// yields zero totals and an empty distribution rather than an error.
pub fn overview(conn: &Connection, user_id: &str) -> EngineResult<Overview> {
    let docs = all_documents(conn, user_id)?;

    let total = docs.len();
    let avg = mean(docs.iter().map(|d| d.cognitive_score));

    let tier_distribution = TIER_ORDER
        .iter()
        .filter_map(|tier| {
            let scores: Vec<f64> = docs
                .iter()
                .filter(|d| d.tier == tier.as_str())
                .map(|d| d.cognitive_score)
                .collect();
            if scores.is_empty() {
                return None;
            }
            Some(TierSlice {
                tier: tier.as_str().to_string(),
                count: scores.len(),
                avg_score: round4(mean(scores.iter().copied())),
                color: tier.color().to_string(),
            })
        })
        .collect();

    let mut sorted = docs;
    sorted.sort_by(|a, b| {
        b.cognitive_score
            .partial_cmp(&a.cognitive_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_documents = sorted
        .iter()
        .take(TOP_DOCUMENTS)
        .map(Document::summary)
        .collect();

    Ok(Overview {
        total_documents: total,
        avg_cognitive_score: round4(avg),
        tier_distribution,
        top_documents,
    })
}

/// Per-document lifecycle view for visualization: one node per document plus
/// a fixed ten-bucket score histogram and the configured tier boundaries.
pub fn lifecycle(
    conn: &Connection,
    user_id: &str,
    tiers: &TierConfig,
) -> EngineResult<Lifecycle> {
    let docs = all_documents(conn, user_id)?;

    let nodes = docs
        .iter()
        .map(|d| {
            let tier: Tier = d.tier.parse().unwrap_or(Tier::Dormant);
            LifecycleNode {
                id: d.id.clone(),
                filename: d.filename.clone(),
                score: d.cognitive_score,
                tier: d.tier.clone(),
                access_count: d.access_count,
                file_type: d.file_type.clone(),
                color: tier.color().to_string(),
                created_at: d.created_at.clone(),
                last_accessed: d.last_accessed.clone(),
            }
        })
        .collect();

    let mut counts = [0usize; HISTOGRAM_BUCKETS];
    for doc in &docs {
        // 1.0 lands in the top bucket
        let idx = ((doc.cognitive_score * HISTOGRAM_BUCKETS as f64) as usize)
            .min(HISTOGRAM_BUCKETS - 1);
        counts[idx] += 1;
    }
    let histogram = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBucket {
            range: format!("{:.1}–{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
            count,
        })
        .collect();

    Ok(Lifecycle {
        nodes,
        histogram,
        tier_thresholds: TierThresholds {
            active: tiers.active_threshold,
            contextual: tiers.contextual_threshold,
            archived: tiers.archived_threshold,
        },
    })
}

/// Per-tier report covering all four tiers, including empty ones. Serialized
/// as a JSON object keyed by tier name.
pub fn tier_report(conn: &Connection, user_id: &str) -> EngineResult<Vec<(Tier, TierDetail)>> {
    let docs = all_documents(conn, user_id)?;

    let report = TIER_ORDER
        .iter()
        .map(|&tier| {
            let scores: Vec<f64> = docs
                .iter()
                .filter(|d| d.tier == tier.as_str())
                .map(|d| d.cognitive_score)
                .collect();
            (
                tier,
                TierDetail {
                    count: scores.len(),
                    avg_score: round4(mean(scores.iter().copied())),
                    color: tier.color().to_string(),
                    description: tier.description().to_string(),
                },
            )
        })
        .collect();

    Ok(report)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
