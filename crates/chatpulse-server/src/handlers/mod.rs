//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod formulas;
pub mod insights;
pub mod metrics;

// Re-export all handlers for use in router
pub use formulas::*;
pub use insights::*;
pub use metrics::*;

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Response for the health check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub analyzers: Vec<&'static str>,
    pub top_n: usize,
    pub catalog_version: u32,
}

/// GET /api/health - Liveness plus engine summary
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        analyzers: state
            .engine
            .analyzer_kinds()
            .iter()
            .map(|k| k.as_str())
            .collect(),
        top_n: state.engine_config.top_n,
        catalog_version: chatpulse_core::CATALOG_VERSION,
    })
}
