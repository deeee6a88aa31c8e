//! ML model inference components

pub mod inference;
pub mod loader;

pub use inference::{Classifier, ClassifierAdapter, OnnxClassifier};
pub use loader::ModelLoader;
