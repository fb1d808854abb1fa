//! End-to-end scoring of one submission.
//!
//! validate -> derive ratio -> assemble vector -> infer -> threshold.
//! Nothing is retained between calls; the classifier is shared read-only.

use crate::error::{Result, ScoringError};
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::{FraudClassifier, InferenceEngine};
use crate::types::assessment::{FraudAssessment, DEFAULT_THRESHOLD};
use crate::types::transaction::TransactionInput;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct FraudScorer {
    extractor: FeatureExtractor,
    engine: InferenceEngine,
    threshold: f64,
}

impl FraudScorer {
    /// Scorer labelling at the default 0.5 threshold
    pub fn new(model: Arc<dyn FraudClassifier>) -> Self {
        Self::with_threshold(model, DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(model: Arc<dyn FraudClassifier>, threshold: f64) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            engine: InferenceEngine::new(model),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    /// Score one submission.
    ///
    /// Invalid input is rejected before the model is touched. Any error is
    /// final for this submission.
    pub fn assess(&self, input: &TransactionInput) -> Result<FraudAssessment> {
        input.validate()?;

        let (derived, features) = self.extractor.extract(input);
        debug!(
            median = derived.median_past_amount,
            ratio = derived.ratio_to_median_purchase_price,
            "Derived feature"
        );

        let probability = self.engine.infer(&features)?;

        Ok(FraudAssessment::new(
            derived,
            features,
            probability,
            self.threshold,
        ))
    }

    /// [`assess`](Self::assess) on the blocking pool, bounded by `timeout`.
    ///
    /// On timeout the inference call is abandoned, not cancelled; its result
    /// is discarded.
    pub async fn assess_with_timeout(
        self: &Arc<Self>,
        input: TransactionInput,
        timeout: Duration,
    ) -> Result<FraudAssessment> {
        let scorer = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || scorer.assess(&input));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ScoringError::Inference(format!(
                "inference task failed: {}",
                e
            ))),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Inference timed out");
                Err(ScoringError::Timeout(timeout.as_millis() as u64))
            }
        }
    }
}
