//! Reply envelope for assessment requests

use crate::error::ScoringError;
use crate::types::assessment::FraudAssessment;
use serde::{Deserialize, Serialize};

/// Either a complete assessment or the reason none was produced.
///
/// An error reply never carries a probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssessmentReply {
    Ok { assessment: FraudAssessment },
    Error { kind: String, message: String },
}

impl AssessmentReply {
    /// Error reply for a payload that could not be decoded as a submission
    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        AssessmentReply::Error {
            kind: "invalid_input".to_string(),
            message: format!("malformed request: {}", reason),
        }
    }

    pub fn into_result(self) -> Result<FraudAssessment, String> {
        match self {
            AssessmentReply::Ok { assessment } => Ok(assessment),
            AssessmentReply::Error { kind, message } => Err(format!("{}: {}", kind, message)),
        }
    }
}

impl From<Result<FraudAssessment, ScoringError>> for AssessmentReply {
    fn from(result: Result<FraudAssessment, ScoringError>) -> Self {
        match result {
            Ok(assessment) => AssessmentReply::Ok { assessment },
            Err(e) => AssessmentReply::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_encoding() {
        let reply = AssessmentReply::from(Err(ScoringError::ModelUnavailable {
            path: "models/creditcardfraud.onnx".to_string(),
            reason: "file not found".to_string(),
        }));

        let json: serde_json::Value = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "model_unavailable");
        assert!(json.get("assessment").is_none());
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("creditcardfraud.onnx"));
    }

    #[test]
    fn test_malformed_reply() {
        let reply = AssessmentReply::malformed("expected value at line 1");
        let err = reply.into_result().unwrap_err();
        assert!(err.starts_with("invalid_input: malformed request"));
    }
}
