//! Risk scoring pipeline: validate, normalize, encode, classify, build result.

use crate::currency::ExchangeRateTable;
use crate::error::ScoringError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::ClassifierAdapter;
use crate::types::request::RiskRequest;
use crate::types::result::RiskResult;
use std::sync::Arc;
use tracing::debug;

/// Scores transactions against process-wide, read-only state.
///
/// Cloning is cheap; clones share the rate table and classifier.
#[derive(Clone)]
pub struct RiskScorer {
    rates: Arc<ExchangeRateTable>,
    feature_extractor: FeatureExtractor,
    classifier: ClassifierAdapter,
}

impl RiskScorer {
    pub fn new(rates: Arc<ExchangeRateTable>, classifier: ClassifierAdapter) -> Self {
        Self {
            rates,
            feature_extractor: FeatureExtractor::new(),
            classifier,
        }
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    /// Validate a raw request body and score it
    pub fn score_body(&self, body: &[u8]) -> Result<RiskResult, ScoringError> {
        let request = RiskRequest::from_body(body)?;
        self.score(request)
    }

    /// Score a validated request.
    ///
    /// Non-positive amounts never reach the classifier.
    pub fn score(&self, request: RiskRequest) -> Result<RiskResult, ScoringError> {
        let RiskRequest {
            transaction_id,
            currency,
            amount,
        } = request;

        if amount <= 0.0 {
            debug!(tx_id = %transaction_id, amount = amount, "Non-positive amount, skipping classifier");
            return Ok(RiskResult::invalid_amount(transaction_id, amount, currency));
        }

        let normalized = self.rates.normalize(amount, &currency);
        if !normalized.is_finite() {
            return Err(ScoringError::invalid_input(format!(
                "Amount {} {} is too large to convert to USD",
                amount, currency
            )));
        }

        let features = self.feature_extractor.encode(normalized);
        let probability = self.classifier.score(&features)?;

        Ok(RiskResult::scored(
            transaction_id,
            amount,
            currency,
            normalized,
            probability,
        ))
    }
}
