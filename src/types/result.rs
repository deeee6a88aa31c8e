//! Scoring result returned to callers

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Probability above which a transaction is flagged
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Categorical verdict for a scored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskStatus {
    #[serde(rename = "Invalid Amount")]
    InvalidAmount,
    #[serde(rename = "Safe")]
    Safe,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl RiskStatus {
    /// Verdict for a classifier probability; exactly 0.5 is still safe
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskStatus::HighRisk
        } else {
            RiskStatus::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::InvalidAmount => "Invalid Amount",
            RiskStatus::Safe => "Safe",
            RiskStatus::HighRisk => "High Risk",
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Echo of the request identifier
    #[serde(rename = "tx_id")]
    pub transaction_id: String,

    /// Amount as received, before conversion
    pub original_amount: f64,

    /// Echo of the declared currency
    pub currency: String,

    /// USD-equivalent amount, rounded to cents
    pub normalized_usd: f64,

    /// Positive-class probability at full precision
    pub fraud_probability: f64,

    pub status: RiskStatus,

    /// Local wall-clock time of construction, `HH:MM:SS`
    pub time: String,
}

impl RiskResult {
    /// Result for a full pass through the classifier
    pub fn scored(
        transaction_id: String,
        original_amount: f64,
        currency: String,
        normalized_usd: f64,
        fraud_probability: f64,
    ) -> Self {
        Self {
            transaction_id,
            original_amount,
            currency,
            normalized_usd: round_cents(normalized_usd),
            fraud_probability,
            status: RiskStatus::from_probability(fraud_probability),
            time: timestamp(),
        }
    }

    /// Result for a non-positive amount that never reached the classifier
    pub fn invalid_amount(transaction_id: String, original_amount: f64, currency: String) -> Self {
        Self {
            transaction_id,
            original_amount,
            currency,
            normalized_usd: 0.0,
            fraud_probability: 0.0,
            status: RiskStatus::InvalidAmount,
            time: timestamp(),
        }
    }
}

/// Round half away from zero to two decimal places.
///
/// Values too large to scale by 100 have no fractional cents and are kept as is.
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
