//! Cognitive score computation.
//!
//! [`breakdown`] is a pure function over a document's usage signals and an
//! optional query similarity; persistence of the resulting score/tier is the
//! caller's responsibility. Curves:
//!
//! - recency: `0.5^(days / half_life_days)` from the last access (creation
//!   time when never accessed) — halves every configured half-life
//! - access: `1 - exp(-count / saturation)` — diminishing returns
//! - final: weighted sum with weights summing to 1, so the result stays in
//!   `[0, 1]` for clamped inputs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ScoringConfig, TierConfig};
use crate::vault::parse_timestamp;
use crate::vault::types::{Document, Tier};

/// The explainable decomposition of a cognitive score. Derived on demand,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub final_score: f64,
    pub semantic_similarity: f64,
    pub semantic_percentage: u32,
    pub recency_score: f64,
    pub recency_label: String,
    pub access_score: f64,
    pub access_label: String,
    pub tier: String,
    pub explanation: String,
}

impl ScoreBreakdown {
    pub fn tier_enum(&self) -> Tier {
        // tier was produced from Tier::as_str, so the parse cannot fail
        self.tier.parse().unwrap_or(Tier::Dormant)
    }
}

/// Inputs to the scoring engine, extracted from a document plus the
/// query similarity supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    /// Raw similarity in `[0, 1]`; out-of-range values are clamped.
    pub semantic_similarity: f64,
    pub access_count: u32,
    pub last_accessed: Option<&'a str>,
    pub created_at: &'a str,
}

impl<'a> ScoreInputs<'a> {
    /// Score a stored document. `semantic` overrides the persisted semantic
    /// component (search-time similarity); `None` uses the last known value.
    pub fn for_document(doc: &'a Document, semantic: Option<f64>) -> Self {
        Self {
            semantic_similarity: semantic.unwrap_or(doc.semantic_score),
            access_count: doc.access_count,
            last_accessed: doc.last_accessed.as_deref(),
            created_at: &doc.created_at,
        }
    }
}

/// Exponential half-life decay over elapsed days.
pub fn recency_score(days_elapsed: f64, half_life_days: f64) -> f64 {
    let days = days_elapsed.max(0.0);
    0.5f64.powf(days / half_life_days)
}

/// Saturating access-frequency score; zero accesses score zero.
pub fn access_score(access_count: u32, saturation: f64) -> f64 {
    1.0 - (-(f64::from(access_count)) / saturation).exp()
}

/// Compute the full score breakdown for the given inputs at time `now`.
pub fn breakdown(
    inputs: ScoreInputs<'_>,
    now: DateTime<Utc>,
    scoring: &ScoringConfig,
    tiers: &TierConfig,
) -> ScoreBreakdown {
    let semantic = inputs.semantic_similarity.clamp(0.0, 1.0);

    let created = parse_timestamp(inputs.created_at);
    let last_touch = inputs
        .last_accessed
        .map(parse_timestamp)
        .unwrap_or(created);

    let days_since_touch = days_between(last_touch, now);
    let days_since_created = days_between(created, now);

    let recency = recency_score(days_since_touch, scoring.recency_half_life_days);
    let access = access_score(inputs.access_count, scoring.access_saturation);

    let final_score = (scoring.semantic_weight * semantic
        + scoring.recency_weight * recency
        + scoring.access_weight * access)
        .clamp(0.0, 1.0);

    let tier = Tier::classify(final_score, tiers);

    let semantic_percentage = (semantic * 100.0).round() as u32;
    let recency_label = recency_label(days_since_touch);
    let access_label = access_label(inputs.access_count, days_since_created);

    let dominant = dominant_factor(
        scoring.semantic_weight * semantic,
        scoring.recency_weight * recency,
        scoring.access_weight * access,
    );
    let explanation = format!(
        "Matched {semantic_percentage}% semantically to your query. {recency_label}. \
         {access_label}. Driven mostly by {dominant}; classified as {tier} ({}).",
        tier.description()
    );

    ScoreBreakdown {
        final_score: round4(final_score),
        semantic_similarity: round4(semantic),
        semantic_percentage,
        recency_score: round4(recency),
        recency_label,
        access_score: round4(access),
        access_label,
        tier: tier.as_str().to_string(),
        explanation,
    }
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_seconds() as f64 / 86_400.0).max(0.0)
}

/// Discrete elapsed-time bucket, independent of the numeric decay curve.
fn recency_label(days: f64) -> String {
    if days < 1.0 {
        "Accessed today".to_string()
    } else if days < 3.0 {
        "Recent activity detected".to_string()
    } else if days < 7.0 {
        "Accessed this week".to_string()
    } else if days < 30.0 {
        "Accessed this month".to_string()
    } else {
        format!("Last accessed {} days ago", days as u64)
    }
}

/// Rate-aware usage bucket derived from count and document age.
fn access_label(count: u32, days_since_created: f64) -> String {
    let age_days = days_since_created.max(1.0);
    let per_week = f64::from(count) / (age_days / 7.0).max(1.0);
    if per_week >= 5.0 {
        format!("{count}× accessed — very frequent")
    } else if per_week >= 2.0 {
        format!("{count}× accessed this period — frequent")
    } else if count >= 3 {
        format!("{count}× accessed")
    } else if count == 1 {
        "Accessed once".to_string()
    } else {
        "Rarely accessed".to_string()
    }
}

fn dominant_factor(semantic_weighted: f64, recency_weighted: f64, access_weighted: f64) -> &'static str {
    if semantic_weighted >= recency_weighted && semantic_weighted >= access_weighted {
        "semantic relevance"
    } else if recency_weighted >= access_weighted {
        "recent activity"
    } else {
        "access frequency"
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
