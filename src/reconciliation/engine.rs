//! Reconciliation Engine
//!
//! Bank records are matched to stored payments by exact payment reference.
//! Differences on a matched reference are reported, never corrected.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BankPaymentData, PaymentNotification};
use crate::error::AppError;
use crate::storage::PaymentStore;

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub total_bank_records: usize,
    pub matched_count: usize,
    /// In the bank data but not stored
    pub unmatched_bank_records: Vec<BankPaymentData>,
    /// Stored within the bank data's date range but absent from it
    pub missing_payments: Vec<PaymentNotification>,
    pub discrepancies: Vec<String>,
    pub reconciled_at: DateTime<Utc>,
}

/// Compares bank records with the payment store
#[derive(Clone)]
pub struct ReconciliationEngine {
    payments: Arc<dyn PaymentStore>,
}

impl ReconciliationEngine {
    pub fn new(payments: Arc<dyn PaymentStore>) -> Self {
        Self { payments }
    }

    /// Reconcile a bank statement against stored payments.
    ///
    /// Every bank record is counted exactly once, as matched or unmatched.
    pub async fn reconcile(&self, bank_records: &[BankPaymentData]) -> Result<ReconciliationResult, AppError> {
        let references: Vec<String> = bank_records
            .iter()
            .map(|r| r.payment_reference.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let stored: HashMap<String, PaymentNotification> = self
            .payments
            .find_by_references(&references)
            .await?
            .into_iter()
            .map(|p| (p.payment_reference.clone(), p))
            .collect();

        let mut matched_count = 0;
        let mut unmatched_bank_records = Vec::new();
        let mut discrepancies = Vec::new();
        let mut seen = HashSet::new();

        for record in bank_records {
            if !seen.insert(record.payment_reference.as_str()) {
                discrepancies.push(format!(
                    "Payment reference {} appears more than once in bank data",
                    record.payment_reference
                ));
            }

            match stored.get(&record.payment_reference) {
                Some(payment) => {
                    matched_count += 1;
                    compare(record, payment, &mut discrepancies);
                }
                None => unmatched_bank_records.push(record.clone()),
            }
        }

        let missing_payments = self.missing_payments(bank_records, &seen).await?;

        tracing::info!(
            total = bank_records.len(),
            matched = matched_count,
            unmatched = unmatched_bank_records.len(),
            missing = missing_payments.len(),
            discrepancies = discrepancies.len(),
            "Reconciliation completed"
        );

        Ok(ReconciliationResult {
            total_bank_records: bank_records.len(),
            matched_count,
            unmatched_bank_records,
            missing_payments,
            discrepancies,
            reconciled_at: Utc::now(),
        })
    }

    /// Stored payments dated within the bank data's range that the bank
    /// did not report
    async fn missing_payments(
        &self,
        bank_records: &[BankPaymentData],
        bank_references: &HashSet<&str>,
    ) -> Result<Vec<PaymentNotification>, AppError> {
        let dates = bank_records.iter().map(|r| r.payment_date);
        let (Some(from), Some(to)) = (dates.clone().min(), dates.max()) else {
            return Ok(Vec::new());
        };

        let missing = self
            .payments
            .find_by_date_range(from, to)
            .await?
            .into_iter()
            .filter(|p| !bank_references.contains(p.payment_reference.as_str()))
            .collect();

        Ok(missing)
    }
}

fn compare(record: &BankPaymentData, payment: &PaymentNotification, discrepancies: &mut Vec<String>) {
    let reference = &record.payment_reference;

    if record.amount != payment.amount_paid {
        discrepancies.push(format!(
            "Amount mismatch for {}: bank reported {}, stored {}",
            reference, record.amount, payment.amount_paid
        ));
    }

    if record.payment_date != payment.payment_date {
        discrepancies.push(format!(
            "Date mismatch for {}: bank reported {}, stored {}",
            reference, record.payment_date, payment.payment_date
        ));
    }

    if record.student_number != payment.student_number {
        discrepancies.push(format!(
            "Student mismatch for {}: bank reported {}, stored {}",
            reference, record.student_number, payment.student_number
        ));
    }

    if !record.is_settled() {
        discrepancies.push(format!(
            "Bank status for {} is {} (transaction {})",
            reference, record.status, record.bank_transaction_id
        ));
    }
}
