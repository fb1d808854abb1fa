//! Classifier inference for fraud scoring

use crate::error::{Result, ScoringError};
use crate::feature_extractor::FeatureVector;
use ndarray::Array2;
use ort::session::{Session, SessionOutputs};
use ort::value::Tensor;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A loaded binary classifier.
///
/// `predict` takes one feature row and returns the model's 2-D output;
/// element `[0][0]` is the fraud probability.
pub trait FraudClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Input width the artifact declares, if it declares one
    fn expected_features(&self) -> Option<usize>;

    fn predict(&self, row: &[f32]) -> Result<Array2<f32>>;
}

/// Classifier backed by an ONNX Runtime session.
///
/// Running a session needs exclusive access, so it sits behind a mutex; the
/// model itself is never modified after load.
pub struct OnnxClassifier {
    pub(crate) name: String,
    pub(crate) session: Mutex<Session>,
    pub(crate) input_name: String,
    pub(crate) output_name: String,
    pub(crate) expected_features: Option<usize>,
}

impl FraudClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_features(&self) -> Option<usize> {
        self.expected_features
    }

    fn predict(&self, row: &[f32]) -> Result<Array2<f32>> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, row.len() as i64];
        let input_tensor = Tensor::from_array((shape, row.to_vec()))
            .map_err(|e| ScoringError::Inference(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ScoringError::Inference(format!("session lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        extract_rows(&outputs, &self.output_name, &self.name)
    }
}

/// Pull the probability tensor out of the session outputs.
///
/// Prefers the named probability output and falls back to the first float
/// tensor that is not a label.
fn extract_rows(outputs: &SessionOutputs, output_name: &str, model_name: &str) -> Result<Array2<f32>> {
    if let Some(output) = outputs.get(output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            debug!(model = %model_name, output = %output_name, "Extracted from tensor");
            return to_rows(shape, data);
        }
    }

    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            debug!(model = %model_name, output = %name, "Extracted from tensor (fallback)");
            return to_rows(shape, data);
        }
    }

    Err(ScoringError::Inference(format!(
        "model {} produced no float tensor output",
        model_name
    )))
}

/// Reshape raw tensor data into rows; a 1-D output is a single row.
fn to_rows(dims: &[i64], data: &[f32]) -> Result<Array2<f32>> {
    let (rows, cols) = match dims {
        [] => (1, data.len()),
        [n] => (1, (*n).max(0) as usize),
        [n, rest @ ..] => (
            (*n).max(0) as usize,
            rest.iter().map(|&d| d.max(0) as usize).product(),
        ),
    };

    Array2::from_shape_vec((rows, cols), data.to_vec()).map_err(|e| {
        ScoringError::Inference(format!("unexpected output shape {:?}: {}", dims, e))
    })
}

/// Invokes the shared classifier once per feature vector.
#[derive(Clone)]
pub struct InferenceEngine {
    model: Arc<dyn FraudClassifier>,
}

impl InferenceEngine {
    pub fn new(model: Arc<dyn FraudClassifier>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Fraud probability for one feature vector.
    ///
    /// The model is called exactly once. A width the model does not accept
    /// is a [`ScoringError::ShapeMismatch`]; an output without a usable
    /// `[0][0]` probability is a [`ScoringError::Inference`]. No fallback
    /// score is ever produced.
    pub fn infer(&self, features: &FeatureVector) -> Result<f64> {
        if let Some(expected) = self.model.expected_features() {
            if expected != features.len() {
                return Err(ScoringError::ShapeMismatch {
                    expected,
                    actual: features.len(),
                });
            }
        }

        let output = self.model.predict(features.as_slice())?;

        let score = output
            .get((0, 0))
            .copied()
            .ok_or_else(|| ScoringError::Inference("model returned an empty output".to_string()))?
            as f64;

        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(ScoringError::Inference(format!(
                "probability {} outside [0, 1]",
                score
            )));
        }

        debug!(
            model = %self.model.name(),
            features = ?features.named(),
            probability = score,
            "Inference complete"
        );

        Ok(score)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Classifier returning a fixed output and recording what it was given
    pub struct StubClassifier {
        output: Array2<f32>,
        expected: Option<usize>,
        delay: Option<Duration>,
        pub calls: AtomicUsize,
        pub last_row: Mutex<Vec<f32>>,
    }

    impl StubClassifier {
        pub fn returning(score: f32) -> Self {
            Self::with_output(Array2::from_elem((1, 1), score))
        }

        pub fn with_output(output: Array2<f32>) -> Self {
            Self {
                output,
                expected: Some(crate::feature_extractor::FEATURE_COUNT),
                delay: None,
                calls: AtomicUsize::new(0),
                last_row: Mutex::new(Vec::new()),
            }
        }

        pub fn expecting(mut self, width: Option<usize>) -> Self {
            self.expected = width;
            self
        }

        pub fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl FraudClassifier for StubClassifier {
        fn name(&self) -> &str {
            "stub"
        }

        fn expected_features(&self) -> Option<usize> {
            self.expected
        }

        fn predict(&self, row: &[f32]) -> Result<Array2<f32>> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_row.lock().unwrap() = row.to_vec();
            Ok(self.output.clone())
        }
    }
}
