//! Error taxonomy for a single fraud assessment.
//!
//! Every variant is request-scoped and terminal: the caller reports it and
//! makes no prediction claim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// A numeric field is negative or not finite, or a flag is outside {0, 1}.
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The classifier artifact could not be located or loaded.
    #[error("model unavailable at {path}: {reason}")]
    ModelUnavailable { path: String, reason: String },

    /// The assembled feature vector does not fit the model's input contract.
    #[error("shape mismatch: model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The model ran but produced no usable probability.
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("inference timed out after {0} ms")]
    Timeout(u64),
}

impl ScoringError {
    /// Stable identifier used in wire replies.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::InvalidInput { .. } => "invalid_input",
            ScoringError::ModelUnavailable { .. } => "model_unavailable",
            ScoringError::ShapeMismatch { .. } => "shape_mismatch",
            ScoringError::Inference(_) => "inference",
            ScoringError::Timeout(_) => "timeout",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = ScoringError::ShapeMismatch {
            expected: 8,
            actual: 7,
        };
        assert_eq!(err.kind(), "shape_mismatch");
        assert_eq!(
            err.to_string(),
            "shape mismatch: model expects 8 features, got 7"
        );

        let err = ScoringError::InvalidInput {
            field: "current_amount",
            reason: "must be non-negative, got -1".to_string(),
        };
        assert_eq!(err.kind(), "invalid_input");
        assert!(err.to_string().contains("current_amount"));

        assert_eq!(ScoringError::Timeout(1000).kind(), "timeout");
    }
}
