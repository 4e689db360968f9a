//! Insight handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{AppError, AppState, MAX_GROUPS_PER_REQUEST};
use chatpulse_core::insights::top_insights as take_top;
use chatpulse_core::{GroupAnalysisInput, SmartInsight};

/// Request body for insight generation
#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub groups: Vec<GroupAnalysisInput>,
    /// Headline size (defaults to the configured top N)
    pub limit: Option<usize>,
}

/// Ranked insights plus the size of the list before truncation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub insights: Vec<SmartInsight>,
    pub total: usize,
}

/// Run the engine on the blocking pool
async fn rank(state: &AppState, groups: Vec<GroupAnalysisInput>) -> Result<Vec<SmartInsight>, AppError> {
    if groups.len() > MAX_GROUPS_PER_REQUEST {
        return Err(AppError::bad_request(&format!(
            "Too many groups: {} (max {})",
            groups.len(),
            MAX_GROUPS_PER_REQUEST
        )));
    }

    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || engine.rank_insights(&groups))
        .await
        .map_err(|e| {
            error!(error = %e, "Insight analysis task failed");
            AppError::internal("Insight analysis failed")
        })
}

/// POST /api/insights - Headline insights across all submitted groups
pub async fn top_insights(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InsightRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let limit = req.limit.unwrap_or_else(|| state.engine.top_n());
    let ranked = rank(&state, req.groups).await?;
    let total = ranked.len();

    Ok(Json(InsightsResponse {
        insights: take_top(ranked, limit),
        total,
    }))
}

/// POST /api/insights/all - Full ranked list
pub async fn all_insights(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InsightRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let ranked = rank(&state, req.groups).await?;
    let total = ranked.len();

    Ok(Json(InsightsResponse {
        insights: ranked,
        total,
    }))
}
