//! Scoring pipeline errors

use thiserror::Error;

/// Failure of a single scoring request.
///
/// Every variant ends the request with the `{"error": ...}` response shape;
/// no partial result is ever produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// Body missing, malformed, not an object, or a field of the wrong type
    #[error("{0}")]
    InvalidInput(String),

    /// The loaded classifier failed or returned an unusable distribution
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ScoringError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ScoringError::InvalidInput(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        ScoringError::Inference(message.into())
    }
}
