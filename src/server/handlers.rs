//! HTTP handlers

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ScoringError;
use crate::server::state::AppState;

/// Failure body: `{"error": "<message>"}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ScoringError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Score one transaction
pub async fn analyze_risk(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    match state.scorer.score_body(&body) {
        Ok(result) => {
            let processing_time = start.elapsed();
            state.metrics.record_result(&result, processing_time);

            info!(
                tx_id = %result.transaction_id,
                currency = %result.currency,
                normalized_usd = result.normalized_usd,
                fraud_probability = result.fraud_probability,
                status = %result.status,
                processing_time_us = processing_time.as_micros(),
                "Transaction scored"
            );

            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            state.metrics.record_rejection(start.elapsed());
            if let ScoringError::InvalidInput(_) = &e {
                debug!(error = %e, "Rejected scoring request");
            }
            e.into_response()
        }
    }
}

/// Liveness plus classifier availability
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let classifier = state.scorer.classifier();
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": classifier.is_available(),
        "model": classifier.model_name(),
    }))
}

/// Current scoring counters
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}
