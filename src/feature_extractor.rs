//! Feature derivation and vector assembly for the fraud classifier.
//!
//! The classifier was trained on seven columns. Six of them are passed
//! through from the form; `ratio_to_median_purchase_price` is derived here
//! from the three prior transaction amounts.

use crate::types::transaction::TransactionInput;
use serde::{Deserialize, Serialize};

/// Number of columns the classifier consumes.
pub const FEATURE_COUNT: usize = 7;

/// Column names in the order the classifier was trained on. Never reorder.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "distance_from_home",
    "distance_from_last_transaction",
    "ratio_to_median_purchase_price",
    "repeat_retailer",
    "used_chip",
    "used_pin_number",
    "online_order",
];

/// Index of the derived ratio within the vector.
pub const RATIO_INDEX: usize = 2;

/// Divisor used when every prior amount is zero.
///
/// Legacy policy: with no purchase history the current amount is compared
/// against 1.0 instead of producing an infinite ratio. This is not derived
/// from the data and should not be read as the right treatment of an empty
/// history.
pub const NEUTRAL_MEDIAN: f64 = 1.0;

/// Median divisor and the ratio computed from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeature {
    /// Median of the prior amounts after the all-zero fallback
    pub median_past_amount: f64,
    /// `current / median`, rounded to 3 decimals
    pub ratio_to_median_purchase_price: f64,
}

/// Middle value of three amounts.
pub fn median_of_three(amounts: [f64; 3]) -> f64 {
    let [a, b, c] = amounts;
    a.max(b).min(a.min(b).max(c))
}

/// Round to 3 decimal places, correctly rounded on the exact binary value.
///
/// Exact ties go to the even digit (`0.0625` -> `0.062`), and values stored
/// just below a tie round down (`1.0005` -> `1.0`). Scaling by 1000 first
/// would round twice and disagree on both.
pub fn round3(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

/// Compute the median-ratio feature together with the divisor it used.
///
/// Callers validate that every input is finite and non-negative.
pub fn derive_feature(amounts: [f64; 3], current: f64) -> DerivedFeature {
    let median_past_amount = if amounts.iter().all(|&v| v == 0.0) {
        NEUTRAL_MEDIAN
    } else {
        median_of_three(amounts)
    };

    // Reachable when two of three amounts are zero.
    let ratio = if median_past_amount == 0.0 {
        0.0
    } else {
        current / median_past_amount
    };

    DerivedFeature {
        median_past_amount,
        ratio_to_median_purchase_price: round3(ratio),
    }
}

/// Ratio of the current amount to the median of the prior three.
pub fn derive(amounts: [f64; 3], current: f64) -> f64 {
    derive_feature(amounts, current).ratio_to_median_purchase_price
}

/// The seven model inputs in training column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Assemble the vector from pass-through fields and the derived ratio.
    pub fn assemble(
        distance_from_home: f64,
        distance_from_last_transaction: f64,
        ratio_to_median_purchase_price: f64,
        flags: [u8; 4],
    ) -> Self {
        Self([
            distance_from_home as f32,
            distance_from_last_transaction as f32,
            ratio_to_median_purchase_price as f32,
            flag(flags[0]),
            flag(flags[1]),
            flag(flags[2]),
            flag(flags[3]),
        ])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Named view, for logging and display
    pub fn named(&self) -> Vec<(&'static str, f32)> {
        FEATURE_NAMES.iter().copied().zip(self.0).collect()
    }
}

fn flag(value: u8) -> f32 {
    if value == 1 {
        1.0
    } else {
        0.0
    }
}

/// Turns a validated submission into model input.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Derive the ratio and assemble the vector for one submission.
    pub fn extract(&self, tx: &TransactionInput) -> (DerivedFeature, FeatureVector) {
        let derived = derive_feature(tx.history(), tx.current_amount);
        let vector = FeatureVector::assemble(
            tx.distance_from_home,
            tx.distance_from_last_transaction,
            derived.ratio_to_median_purchase_price,
            tx.flags(),
        );
        (derived, vector)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
