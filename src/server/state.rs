//! Shared application state

use crate::metrics::ScoringMetrics;
use crate::pipeline::RiskScorer;
use std::sync::Arc;

/// State handed to every request handler.
///
/// Scoring state is read-only; only the metrics counters change.
#[derive(Clone)]
pub struct AppState {
    pub scorer: RiskScorer,
    pub metrics: Arc<ScoringMetrics>,
}

impl AppState {
    pub fn new(scorer: RiskScorer) -> Self {
        Self {
            scorer,
            metrics: Arc::new(ScoringMetrics::new()),
        }
    }
}
