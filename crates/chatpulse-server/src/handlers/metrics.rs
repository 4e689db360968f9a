//! Metric catalog handlers

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use crate::AppError;
use chatpulse_core::{
    catalog, compute_metrics, compute_metrics_with_previous, GroupAnalysisInput, MetricCategory,
    MetricDescriptor, MetricValues, CATALOG_VERSION,
};

/// Query parameters for the catalog
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Only this category (basic, growth, quality, distribution, temporal, advanced)
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub version: u32,
    pub metrics: Vec<MetricDescriptor>,
}

/// GET /api/metrics - List catalog entries
pub async fn list_metrics(Query(params): Query<CatalogQuery>) -> Result<Json<CatalogResponse>, AppError> {
    let metrics = match params.category.as_deref() {
        Some(category) => {
            let category: MetricCategory = category
                .parse()
                .map_err(|e: chatpulse_core::Error| AppError::bad_request(&e.to_string()))?;
            catalog::by_category(category).copied().collect()
        }
        None => catalog::all().to_vec(),
    };

    Ok(Json(CatalogResponse {
        version: CATALOG_VERSION,
        metrics,
    }))
}

/// Request body for computing a group's metrics
#[derive(Debug, Deserialize)]
pub struct GroupMetricsRequest {
    pub group: GroupAnalysisInput,
    /// Previous window; adds `prev_` values and window-over-window growth
    pub previous: Option<GroupAnalysisInput>,
}

/// POST /api/groups/metrics - Value of every catalog metric for a group
pub async fn group_metrics(Json(req): Json<GroupMetricsRequest>) -> Json<MetricValues> {
    let values = match &req.previous {
        Some(previous) => compute_metrics_with_previous(&req.group, previous),
        None => compute_metrics(&req.group),
    };
    Json(values)
}
