//! Classifier inference for risk scoring

use crate::config::ModelConfig;
use crate::error::ScoringError;
use crate::feature_extractor::{FeatureVector, FEATURE_COUNT};
use crate::models::loader::{LoadedModel, ModelLoader};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Index of the fraud class in a two-class distribution
pub const POSITIVE_CLASS: usize = 1;

/// A probabilistic classifier over [`FeatureVector`]s.
///
/// Returns one class distribution per input row, in class-id order.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn predict_proba(&self, batch: &[FeatureVector]) -> Result<Vec<Vec<f64>>>;
}

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    name: String,
    /// `Session::run` needs exclusive access
    model: Mutex<LoadedModel>,
}

impl OnnxClassifier {
    pub fn new(model: LoadedModel) -> Self {
        Self {
            name: model.name.clone(),
            model: Mutex::new(model),
        }
    }

    /// Load the configured model file
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load_model(&config.path, &config.name)?;
        Ok(Self::new(model))
    }

    /// Extract per-row class distributions from model output.
    /// Handles tensor outputs and seq(map) outputs (scikit-learn ZipMap, LightGBM)
    fn extract_distributions(
        &self,
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
        rows: usize,
    ) -> Result<Vec<Vec<f64>>> {
        if let Some(output) = outputs.get(output_name) {
            if let Some(distributions) = self.extract_from_value(output, rows)? {
                return Ok(distributions);
            }
        }

        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(distributions) = self.extract_from_value(&output, rows)? {
                debug!(model = %self.name, output = %name, "Extracted probabilities (fallback output)");
                return Ok(distributions);
            }
        }

        anyhow::bail!("Model {} produced no probability output", self.name)
    }

    fn extract_from_value(
        &self,
        output: &ort::value::DynValue,
        rows: usize,
    ) -> Result<Option<Vec<Vec<f64>>>> {
        let dtype = output.dtype();

        if let Ok(tensor) = output.try_extract_tensor::<f32>() {
            let (shape, data) = tensor;
            let dims: Vec<i64> = shape.iter().copied().collect();
            return distributions_from_tensor(&dims, data, rows).map(Some);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            return self.extract_from_sequence_map(output).map(Some);
        }

        Ok(None)
    }

    /// Extract distributions from seq(map(int64, float)), one map per row
    fn extract_from_sequence_map(&self, output: &ort::value::DynValue) -> Result<Vec<Vec<f64>>> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        if maps.is_empty() {
            anyhow::bail!("Empty sequence");
        }

        maps.iter()
            .map(|map_value| -> Result<Vec<f64>> {
                let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
                Ok(distribution_from_pairs(&kv_pairs))
            })
            .collect()
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, batch: &[FeatureVector]) -> Result<Vec<Vec<f64>>> {
        use ort::value::Tensor;

        let flat: Vec<f32> = batch.iter().flat_map(|v| v.to_f32()).collect();
        let shape = vec![batch.len() as i64, FEATURE_COUNT as i64];
        let input_tensor =
            Tensor::from_array((shape, flat)).context("Failed to create input tensor")?;

        let mut model = self
            .model
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model
            .session
            .run(ort::inputs![input_name.as_str() => input_tensor])?;

        self.extract_distributions(&outputs, &output_name, batch.len())
    }
}

/// Split a `[rows, classes]` (or `[rows]`, `[rows, 1]`) tensor into rows.
///
/// A single column is read as the positive-class probability.
pub fn distributions_from_tensor(dims: &[i64], data: &[f32], rows: usize) -> Result<Vec<Vec<f64>>> {
    let classes = match dims {
        [_, classes] => *classes as usize,
        [_] => 1,
        _ => anyhow::bail!("Unexpected probability tensor shape {:?}", dims),
    };

    if classes == 0 || data.len() != rows * classes {
        anyhow::bail!(
            "Probability tensor shape {:?} does not match batch of {}",
            dims,
            rows
        );
    }

    Ok(data
        .chunks(classes)
        .map(|row| {
            if classes == 1 {
                let p = row[0] as f64;
                vec![1.0 - p, p]
            } else {
                row.iter().map(|&p| p as f64).collect()
            }
        })
        .collect())
}

/// Order `(class_id, probability)` pairs into a dense distribution
pub fn distribution_from_pairs(pairs: &[(i64, f32)]) -> Vec<f64> {
    let size = pairs
        .iter()
        .map(|(class_id, _)| (*class_id).max(0) as usize + 1)
        .max()
        .unwrap_or(0);
    let mut distribution = vec![0.0; size];
    for (class_id, prob) in pairs {
        if *class_id >= 0 {
            distribution[*class_id as usize] = *prob as f64;
        }
    }
    distribution
}

/// Invokes the classifier for one vector and extracts the fraud probability.
///
/// Holds no classifier when the model failed to load; scoring then reports
/// 0.0 instead of failing the request.
#[derive(Clone)]
pub struct ClassifierAdapter {
    classifier: Option<Arc<dyn Classifier>>,
}

impl ClassifierAdapter {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Adapter with no classifier; every score is the 0.0 fallback
    pub fn unavailable() -> Self {
        Self { classifier: None }
    }

    /// Load the configured ONNX model, degrading to [`Self::unavailable`] on failure
    pub fn load(config: &ModelConfig) -> Self {
        match OnnxClassifier::load(config) {
            Ok(classifier) => {
                info!(model = %config.name, path = %config.path, "Classifier loaded");
                Self::new(Arc::new(classifier))
            }
            Err(e) => {
                warn!(
                    model = %config.name,
                    path = %config.path,
                    error = %e,
                    "Classifier unavailable, every transaction will score 0.0"
                );
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.classifier.as_deref().map(|c| c.name())
    }

    /// Positive-class probability for `features`, in [0, 1]
    pub fn score(&self, features: &FeatureVector) -> Result<f64, ScoringError> {
        let Some(classifier) = &self.classifier else {
            debug!("No classifier loaded, using fallback probability");
            return Ok(0.0);
        };

        let distributions = classifier
            .predict_proba(std::slice::from_ref(features))
            .map_err(|e| {
                error!(model = %classifier.name(), error = %e, "Classifier inference failed");
                ScoringError::inference(e.to_string())
            })?;

        let probability = distributions
            .first()
            .and_then(|row| row.get(POSITIVE_CLASS))
            .copied()
            .ok_or_else(|| {
                ScoringError::inference(format!(
                    "Model {} did not return a two-class distribution",
                    classifier.name()
                ))
            })?;

        if !probability.is_finite() {
            return Err(ScoringError::inference(format!(
                "Model {} returned non-finite probability",
                classifier.name()
            )));
        }

        Ok(probability.clamp(0.0, 1.0))
    }
}
