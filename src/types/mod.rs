//! Type definitions for the fraud scorer

pub mod assessment;
pub mod reply;
pub mod transaction;

pub use assessment::{FraudAssessment, Verdict};
pub use reply::AssessmentReply;
pub use transaction::TransactionInput;
