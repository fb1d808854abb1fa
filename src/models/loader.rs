//! ONNX classifier loader

use crate::error::{Result, ScoringError};
use crate::models::inference::OnnxClassifier;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

/// Loader for the fraud classifier artifact
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the classifier from an ONNX file.
    ///
    /// Any failure to find, open or parse the artifact is reported as
    /// [`ScoringError::ModelUnavailable`].
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<OnnxClassifier> {
        let path = path.as_ref();
        let name = model_name(path);

        if !path.is_file() {
            warn!(model = %name, path = %path.display(), "Model file not found");
            return Err(unavailable(path, "file not found"));
        }

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(self.onnx_threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| unavailable(path, e))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| unavailable(path, "model declares no inputs"))?;
        let input_name = input.name.clone();

        // Last dimension is the feature width; dynamic dims are negative
        let expected_features = input
            .input_type
            .tensor_shape()
            .and_then(|shape| shape.last().copied())
            .filter(|&dim| dim > 0)
            .map(|dim| dim as usize);

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| unavailable(path, "model declares no outputs"))?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            expected_features = ?expected_features,
            "Model loaded successfully"
        );

        Ok(OnnxClassifier {
            name,
            session: Mutex::new(session),
            input_name,
            output_name,
            expected_features,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "classifier".to_string())
}

fn unavailable(path: &Path, reason: impl std::fmt::Display) -> ScoringError {
    ScoringError::ModelUnavailable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_unavailable() {
        let loader = ModelLoader::new();
        let err = loader
            .load_model("does/not/exist/creditcardfraud.onnx")
            .err()
            .unwrap();

        match err {
            ScoringError::ModelUnavailable { path, reason } => {
                assert!(path.ends_with("creditcardfraud.onnx"));
                assert_eq!(reason, "file not found");
            }
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::new().load_model(dir.path()).err().unwrap();
        assert_eq!(err.kind(), "model_unavailable");
    }

    #[test]
    fn test_model_name_from_path() {
        assert_eq!(
            model_name(Path::new("models/creditcardfraud.onnx")),
            "creditcardfraud"
        );
    }

    #[test]
    fn test_thread_count_floor() {
        assert_eq!(ModelLoader::with_threads(0).onnx_threads, 1);
    }
}
