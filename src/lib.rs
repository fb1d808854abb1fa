//! Card Fraud Scorer Library
//!
//! Derives the ratio-to-median purchase price feature from a transaction's
//! recent history and scores the resulting feature vector with a pre-trained
//! binary fraud classifier.

pub mod config;
pub mod consumer;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod scorer;
pub mod telemetry;
pub mod types;
pub mod workers;

pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use error::ScoringError;
pub use feature_extractor::{derive, FeatureExtractor, FeatureVector};
pub use models::{FraudClassifier, InferenceEngine, ModelLoader};
pub use producer::ReplyPublisher;
pub use scorer::FraudScorer;
pub use types::{AssessmentReply, FraudAssessment, TransactionInput, Verdict};
