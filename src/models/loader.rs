//! Classifier session loading

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Classifier session plus the tensor names used to call it
pub struct LoadedModel {
    pub name: String,
    pub session: Session,
    /// Feature batch input
    pub input_name: String,
    /// Class-probability output
    pub output_name: String,
}

/// Creates classifier sessions with a fixed intra-op thread count
pub struct ModelLoader {
    onnx_threads: usize,
}

impl ModelLoader {
    /// Initialise the ONNX Runtime environment; every session gets `onnx_threads` intra-op threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        let onnx_threads = onnx_threads.max(1);
        info!(onnx_threads, "ONNX Runtime ready");
        Ok(Self { onnx_threads })
    }

    /// Build a session for the classifier at `path`
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let (input_name, output_name) = tensor_names(&session);
        info!(
            model = %name,
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            "Classifier session created"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}

/// Feature input and probability output names declared by the session
fn tensor_names(session: &Session) -> (String, String) {
    let input = session
        .inputs
        .first()
        .map_or("float_input", |i| i.name.as_str());
    let outputs: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
    let output = select_probability_output(&outputs).unwrap_or("probabilities");
    (input.to_string(), output.to_string())
}

/// Pick the output carrying class probabilities.
///
/// scikit-learn exports name it `output_probability` next to `output_label`,
/// so a name containing "prob" wins over any other candidate.
pub fn select_probability_output<'a>(names: &[&'a str]) -> Option<&'a str> {
    names
        .iter()
        .find(|n| n.contains("prob"))
        .or_else(|| names.iter().rev().find(|n| !n.contains("label")))
        .or_else(|| names.last())
        .copied()
}
