//! Summary Handler
//!
//! Per-student payment totals.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::storage::PaymentStore;

use super::PaymentSummary;

/// Read-side queries over stored payments
#[derive(Clone)]
pub struct PaymentSummaryService {
    payments: Arc<dyn PaymentStore>,
}

impl PaymentSummaryService {
    pub fn new(payments: Arc<dyn PaymentStore>) -> Self {
        Self { payments }
    }

    /// Totals for one student; zeros when the student has no payments.
    ///
    /// Every figure comes from the same row set, so a concurrent insert
    /// cannot make the total disagree with the count.
    pub async fn get_payment_summary(&self, student_number: &str) -> Result<PaymentSummary, AppError> {
        let payments = self.payments.find_by_student(student_number).await?;

        let total_amount: Decimal = payments.iter().map(|p| p.amount_paid).sum();
        let total_count = payments.len();
        let last_payment_date = payments.iter().map(|p| p.payment_date).max();
        let average_amount = if total_count == 0 {
            Decimal::ZERO
        } else {
            (total_amount / Decimal::from(total_count)).round_dp(2)
        };

        Ok(PaymentSummary {
            student_number: student_number.to_string(),
            total_amount,
            total_count,
            last_payment_date,
            average_amount,
        })
    }
}
