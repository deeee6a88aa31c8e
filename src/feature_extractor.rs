//! Feature encoding for classifier inference.
//!
//! The classifier was trained on a 30-dimensional feature space in which only
//! the last dimension varies in production. Every other slot is held at zero
//! so that scoring is reproducible for a given amount.

use serde::Serialize;

/// Number of features the classifier expects
pub const FEATURE_COUNT: usize = 30;

/// Slot carrying the normalized amount
pub const AMOUNT_INDEX: usize = FEATURE_COUNT - 1;

/// Fixed-shape classifier input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Values narrowed to `f32` for ONNX tensors
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }

    pub fn amount(&self) -> f64 {
        self.0[AMOUNT_INDEX]
    }
}

/// Transforms a normalized amount into model input features.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Zero vector with `normalized_amount` in the last slot.
    pub fn encode(&self, normalized_amount: f64) -> FeatureVector {
        let mut features = [0.0; FEATURE_COUNT];
        features[AMOUNT_INDEX] = normalized_amount;
        FeatureVector(features)
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}
