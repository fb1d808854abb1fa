//! Assessment results handed back to the submitter

use crate::feature_extractor::{DerivedFeature, FeatureVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a transaction is labelled fraudulent.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Binarized classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Fraudulent,
    Legitimate,
}

impl Verdict {
    /// Threshold a probability; equality counts as fraudulent
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Verdict::Fraudulent
        } else {
            Verdict::Legitimate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Fraudulent => "Likely Fraudulent Transaction",
            Verdict::Legitimate => "Likely Legitimate Transaction",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of scoring one submission.
///
/// The raw probability always travels with the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub assessment_id: String,

    /// Median of the prior amounts used as divisor
    pub median_past_amount: f64,

    /// Derived feature, 3 decimals
    pub ratio_to_median_purchase_price: f64,

    /// Exact vector sent to the classifier
    pub features: FeatureVector,

    /// Fraud probability in [0, 1]
    pub fraud_probability: f64,

    pub verdict: Verdict,

    /// Human readable verdict
    pub label: String,

    pub timestamp: DateTime<Utc>,
}

impl FraudAssessment {
    pub fn new(
        derived: DerivedFeature,
        features: FeatureVector,
        fraud_probability: f64,
        threshold: f64,
    ) -> Self {
        let verdict = Verdict::from_score(fraud_probability, threshold);
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            median_past_amount: derived.median_past_amount,
            ratio_to_median_purchase_price: derived.ratio_to_median_purchase_price,
            features,
            fraud_probability,
            verdict,
            label: verdict.label().to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_fraudulent(&self) -> bool {
        self.verdict == Verdict::Fraudulent
    }

    /// Probability at display precision
    pub fn probability_display(&self) -> String {
        format!("{:.4}", self.fraud_probability)
    }

    /// Multi-line report laid out like the entry form's result panel
    pub fn report(&self) -> String {
        format!(
            "Median of last 3 transactions: ₹{}\n\
             Ratio to median purchase price: {}\n\
             Model Prediction (Fraud Probability): {} – {}",
            format_amount(self.median_past_amount),
            format_ratio(self.ratio_to_median_purchase_price),
            self.probability_display(),
            self.label
        )
    }
}

/// Shortest round-trip form; exponent with explicit sign from 1e16 up,
/// e.g. `1.0`, `1.167`, `1e+16`.
pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_finite() && ratio.abs() >= 1e16 {
        let sci = format!("{:e}", ratio);
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => sci,
        }
    } else {
        format!("{:?}", ratio)
    }
}

/// Two decimals with comma thousands separators, e.g. `1,234,567.80`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(probability: f64) -> FraudAssessment {
        let derived = DerivedFeature {
            median_past_amount: 150.0,
            ratio_to_median_purchase_price: 1.167,
        };
        let features = FeatureVector::assemble(5.0, 2.0, 1.167, [1, 1, 0, 0]);
        FraudAssessment::new(derived, features, probability, DEFAULT_THRESHOLD)
    }

    #[test]
    fn test_verdict_from_score() {
        assert_eq!(Verdict::from_score(0.8, 0.5), Verdict::Fraudulent);
        assert_eq!(Verdict::from_score(0.5, 0.5), Verdict::Fraudulent);
        assert_eq!(Verdict::from_score(0.4999, 0.5), Verdict::Legitimate);
        assert_eq!(Verdict::from_score(0.0, 0.5), Verdict::Legitimate);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            Verdict::Fraudulent.to_string(),
            "Likely Fraudulent Transaction"
        );
        assert_eq!(
            Verdict::Legitimate.to_string(),
            "Likely Legitimate Transaction"
        );
    }

    #[test]
    fn test_report_layout() {
        let assessment = sample(0.2);
        assert_eq!(assessment.probability_display(), "0.2000");
        assert_eq!(
            assessment.report(),
            "Median of last 3 transactions: ₹150.00\n\
             Ratio to median purchase price: 1.167\n\
             Model Prediction (Fraud Probability): 0.2000 – Likely Legitimate Transaction"
        );
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(0.0), "0.0");
        assert_eq!(format_ratio(1.0), "1.0");
        assert_eq!(format_ratio(1.167), "1.167");
        assert_eq!(format_ratio(250.0), "250.0");
        assert_eq!(format_ratio(1e16), "1e+16");
        assert_eq!(format_ratio(2.5e17), "2.5e+17");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1.0), "1.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.8), "1,234,567.80");
        assert_eq!(format_amount(123456.0), "123,456.00");
    }

    #[test]
    fn test_assessment_serialization() {
        let assessment = sample(0.8);
        let json = serde_json::to_string(&assessment).unwrap();
        let deserialized: FraudAssessment = serde_json::from_str(&json).unwrap();

        assert_eq!(assessment.assessment_id, deserialized.assessment_id);
        assert_eq!(deserialized.verdict, Verdict::Fraudulent);
        assert_eq!(deserialized.label, "Likely Fraudulent Transaction");
        assert_eq!(deserialized.features, assessment.features);
        assert!(json.contains("\"verdict\":\"fraudulent\""));
    }
}
