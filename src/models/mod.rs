//! Classifier loading and inference

pub mod inference;
pub mod loader;

pub use inference::{FraudClassifier, InferenceEngine, OnnxClassifier};
pub use loader::ModelLoader;
