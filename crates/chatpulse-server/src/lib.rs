//! ChatPulse Web Server
//!
//! Axum-based REST API exposing the insight engine, the formula evaluator and
//! the metric catalog as JSON endpoints.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security headers (CSP, nosniff, frame denial)
//! - Sanitized error responses

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info};

use chatpulse_core::insights::AnalyzerKind;
use chatpulse_core::{EngineConfig, InsightEngine};

mod handlers;

/// Maximum number of groups accepted by one insight request
pub const MAX_GROUPS_PER_REQUEST: usize = 500;

/// Maximum number of formulas accepted by one batch request
pub const MAX_FORMULAS_PER_REQUEST: usize = 200;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    /// Immutable after construction; cloned into blocking tasks
    pub engine: Arc<InsightEngine>,
    pub engine_config: EngineConfig,
}

/// Create the application router
pub fn create_router(
    engine_config: EngineConfig,
    static_dir: Option<&Path>,
    config: ServerConfig,
) -> Router {
    let engine = InsightEngine::with_config(&engine_config);
    info!(
        analyzers = engine.analyzer_kinds().len(),
        disabled = engine_config.disabled.len(),
        top_n = engine.top_n(),
        "Insight engine ready"
    );
    for kind in AnalyzerKind::all() {
        if !engine_config.is_enabled(*kind) {
            info!("  - {} disabled", kind);
        }
    }

    let state = Arc::new(AppState {
        engine: Arc::new(engine),
        engine_config,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Catalog
        .route("/metrics", get(handlers::list_metrics))
        .route("/groups/metrics", post(handlers::group_metrics))
        // Insights
        .route("/insights", post(handlers::top_insights))
        .route("/insights/all", post(handlers::all_insights))
        // Formulas
        .route("/formulas/validate", post(handlers::validate_formula))
        .route("/formulas/evaluate", post(handlers::evaluate_formula))
        .route("/formulas/evaluate-batch", post(handlers::evaluate_formula_batch));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    // CSP: restrict scripts to same-origin, allow inline styles
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    engine_config: EngineConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> anyhow::Result<()> {
    serve_with_config(engine_config, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    engine_config: EngineConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(engine_config, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
