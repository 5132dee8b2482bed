//! Bank statement records
//!
//! Transient input to reconciliation; never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bank statuses that mean the money actually arrived
const SETTLED_STATUSES: &[&str] = &["SUCCESS", "COMPLETED", "SETTLED"];

/// One payment as reported by the bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankPaymentData {
    pub payment_reference: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub student_number: String,
    pub bank_transaction_id: String,
    pub status: String,
}

impl BankPaymentData {
    /// Check whether the bank considers this payment settled
    pub fn is_settled(&self) -> bool {
        SETTLED_STATUSES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(self.status.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bank_record(status: &str) -> BankPaymentData {
        BankPaymentData {
            payment_reference: "REF001".to_string(),
            amount: dec!(100),
            payment_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            student_number: "S12345".to_string(),
            bank_transaction_id: "TX-1".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_settled_status_is_case_insensitive() {
        assert!(bank_record("completed").is_settled());
        assert!(bank_record("SUCCESS").is_settled());
        assert!(!bank_record("REVERSED").is_settled());
    }
}
