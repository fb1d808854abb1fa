//! Raw transaction fields as submitted by the entry form

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};

/// The nine raw fields of one submission.
///
/// Flags are carried as 0/1 integers, matching the form's Yes/No selectors.
/// Nothing here is trusted until [`TransactionInput::validate`] has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Amount of the most recent prior transaction
    pub amount_t1: f64,
    pub amount_t2: f64,
    pub amount_t3: f64,

    /// Amount of the transaction being evaluated
    pub current_amount: f64,

    /// Distance from home (km)
    pub distance_from_home: f64,

    /// Distance from the previous transaction (km)
    pub distance_from_last_transaction: f64,

    pub repeat_retailer: u8,
    pub used_chip: u8,
    #[serde(alias = "used_pin_number")]
    pub used_pin: u8,
    pub online_order: u8,
}

impl TransactionInput {
    /// Create an input with all fields zeroed, as the form starts out
    pub fn new() -> Self {
        Self {
            amount_t1: 0.0,
            amount_t2: 0.0,
            amount_t3: 0.0,
            current_amount: 0.0,
            distance_from_home: 0.0,
            distance_from_last_transaction: 0.0,
            repeat_retailer: 0,
            used_chip: 0,
            used_pin: 0,
            online_order: 0,
        }
    }

    /// Set the three prior transaction amounts
    pub fn with_history(mut self, amounts: [f64; 3]) -> Self {
        self.amount_t1 = amounts[0];
        self.amount_t2 = amounts[1];
        self.amount_t3 = amounts[2];
        self
    }

    pub fn with_current_amount(mut self, amount: f64) -> Self {
        self.current_amount = amount;
        self
    }

    pub fn with_distances(mut self, from_home: f64, from_last_transaction: f64) -> Self {
        self.distance_from_home = from_home;
        self.distance_from_last_transaction = from_last_transaction;
        self
    }

    /// Set the behaviour flags in form order: repeat retailer, chip, PIN, online
    pub fn with_flags(mut self, flags: [u8; 4]) -> Self {
        self.repeat_retailer = flags[0];
        self.used_chip = flags[1];
        self.used_pin = flags[2];
        self.online_order = flags[3];
        self
    }

    /// Prior amounts as a fixed-size sample
    pub fn history(&self) -> [f64; 3] {
        [self.amount_t1, self.amount_t2, self.amount_t3]
    }

    /// Flags in feature vector order
    pub fn flags(&self) -> [u8; 4] {
        [
            self.repeat_retailer,
            self.used_chip,
            self.used_pin,
            self.online_order,
        ]
    }

    /// Reject anything the deriver and classifier are not defined for.
    ///
    /// Amounts and distances must be finite and non-negative; flags must be
    /// exactly 0 or 1.
    pub fn validate(&self) -> Result<()> {
        let amounts = [
            ("amount_t1", self.amount_t1),
            ("amount_t2", self.amount_t2),
            ("amount_t3", self.amount_t3),
            ("current_amount", self.current_amount),
            ("distance_from_home", self.distance_from_home),
            (
                "distance_from_last_transaction",
                self.distance_from_last_transaction,
            ),
        ];

        for (field, value) in amounts {
            if !value.is_finite() {
                return Err(ScoringError::InvalidInput {
                    field,
                    reason: format!("must be a finite number, got {}", value),
                });
            }
            if value < 0.0 {
                return Err(ScoringError::InvalidInput {
                    field,
                    reason: format!("must be non-negative, got {}", value),
                });
            }
        }

        let flags = [
            ("repeat_retailer", self.repeat_retailer),
            ("used_chip", self.used_chip),
            ("used_pin", self.used_pin),
            ("online_order", self.online_order),
        ];

        for (field, value) in flags {
            if value > 1 {
                return Err(ScoringError::InvalidInput {
                    field,
                    reason: format!("must be 0 or 1, got {}", value),
                });
            }
        }

        Ok(())
    }
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"{
            "amount_t1": 100.0,
            "amount_t2": 150.0,
            "amount_t3": 200.0,
            "current_amount": 175.0,
            "distance_from_home": 5.0,
            "distance_from_last_transaction": 2.0,
            "repeat_retailer": 1,
            "used_chip": 1,
            "used_pin_number": 0,
            "online_order": 0
        }"#;

        let tx: TransactionInput = serde_json::from_str(json).unwrap();
        assert_eq!(tx.history(), [100.0, 150.0, 200.0]);
        assert_eq!(tx.flags(), [1, 1, 0, 0]);
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let tx = TransactionInput::new()
            .with_history([10.0, -1.0, 30.0])
            .with_current_amount(5.0);

        match tx.validate() {
            Err(ScoringError::InvalidInput { field, .. }) => assert_eq!(field, "amount_t2"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_distance_rejected() {
        let tx = TransactionInput::new().with_distances(f64::NAN, 1.0);
        assert!(matches!(
            tx.validate(),
            Err(ScoringError::InvalidInput {
                field: "distance_from_home",
                ..
            })
        ));
    }

    #[test]
    fn test_flag_out_of_range_rejected() {
        let tx = TransactionInput::new().with_flags([0, 0, 2, 0]);
        assert!(matches!(
            tx.validate(),
            Err(ScoringError::InvalidInput {
                field: "used_pin",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_flag_fails_to_parse() {
        let json = r#"{
            "amount_t1": 0, "amount_t2": 0, "amount_t3": 0, "current_amount": 0,
            "distance_from_home": 0, "distance_from_last_transaction": 0,
            "repeat_retailer": -1, "used_chip": 0, "used_pin": 0, "online_order": 0
        }"#;
        assert!(serde_json::from_str::<TransactionInput>(json).is_err());
    }

    #[test]
    fn test_zeroed_form_is_valid() {
        assert!(TransactionInput::default().validate().is_ok());
    }
}
