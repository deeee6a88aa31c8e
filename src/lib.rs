//! Fraud Risk Scoring Library
//!
//! Scores a single transaction (identifier, currency, amount) with a
//! pre-trained classifier and returns a fraud probability and verdict.

pub mod config;
pub mod currency;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use currency::ExchangeRateTable;
pub use error::ScoringError;
pub use feature_extractor::{FeatureExtractor, FeatureVector};
pub use models::inference::{Classifier, ClassifierAdapter};
pub use pipeline::RiskScorer;
pub use types::{request::RiskRequest, result::RiskResult, result::RiskStatus};
