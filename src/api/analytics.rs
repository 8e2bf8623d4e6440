//! Analytics endpoints. All three are pure reads.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::vault::analytics::{self, Lifecycle, Overview};

use super::{default_user, with_db, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    #[serde(default = "default_user")]
    pub user_id: String,
}

/// `GET /api/analytics/`
pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Overview>, AppError> {
    let overview = with_db(&state, move |conn| {
        analytics::overview(conn, &params.user_id)
    })
    .await?;
    Ok(Json(overview))
}

/// `GET /api/analytics/lifecycle`
pub async fn lifecycle(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Lifecycle>, AppError> {
    let config = state.config.clone();
    let lifecycle = with_db(&state, move |conn| {
        analytics::lifecycle(conn, &params.user_id, &config.tiers)
    })
    .await?;
    Ok(Json(lifecycle))
}

/// `GET /api/analytics/tiers` — JSON object keyed by tier name.
pub async fn tiers(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = with_db(&state, move |conn| {
        analytics::tier_report(conn, &params.user_id)
    })
    .await?;

    let mut map = serde_json::Map::new();
    for (tier, detail) in report {
        let value = serde_json::to_value(detail)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        map.insert(tier.as_str().to_string(), value);
    }
    Ok(Json(serde_json::Value::Object(map)))
}
