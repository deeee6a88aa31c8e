//! HTTP routes

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::server::handlers;
use crate::server::state::AppState;

/// Scoring endpoint path
pub const ANALYZE_RISK_PATH: &str = "/analyze-risk";

/// Build the service router.
///
/// When `static_dir` exists, unmatched paths are served from it (the landing page).
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route(ANALYZE_RISK_PATH, post(handlers::analyze_risk))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics));

    let router = match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "Serving landing page");
            router.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            warn!(dir = %dir.display(), "Static directory not found, landing page disabled");
            router
        }
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
