//! Result definitions
//!
//! Value objects returned by the payment handlers. They are transient and
//! never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PaymentNotification, PaymentRecord, Student};

// =========================================================================
// ProcessingResult
// =========================================================================

/// Outcome of processing one payment notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub message: String,
    pub student_exists: bool,
    pub student_is_active: bool,
    pub processed_payment: Option<PaymentNotification>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Field-level validation errors, if any
    #[serde(default)]
    pub errors: Vec<String>,
    /// Machine-readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ProcessingResult {
    /// The payment was stored
    pub fn accepted(payment: PaymentNotification, student: &Student, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            message: "Payment processed successfully".to_string(),
            student_exists: true,
            student_is_active: student.is_active,
            processed_payment: Some(payment),
            warnings,
            errors: Vec::new(),
            error_code: None,
        }
    }

    /// A business rule rejected the payment.
    ///
    /// `student` is the looked-up student, or `None` when the lookup never
    /// happened or found nothing.
    pub fn rejected(reason: &DomainError, student: Option<&Student>) -> Self {
        Self {
            success: false,
            message: reason.to_string(),
            student_exists: student.is_some(),
            student_is_active: student.is_some_and(|s| s.is_active),
            processed_payment: None,
            warnings: Vec::new(),
            errors: reason.validation_errors().to_vec(),
            error_code: Some(reason.code().to_string()),
        }
    }

    /// Processing broke down for an infrastructure reason (batch items only)
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            student_exists: false,
            student_is_active: false,
            processed_payment: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            error_code: Some("processing_error".to_string()),
        }
    }
}

// =========================================================================
// BatchProcessingResult
// =========================================================================

/// A record that was not accepted, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub payment: PaymentRecord,
    pub error: String,
}

/// Outcome of processing a batch; `results[i]` belongs to input `i`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchProcessingResult {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<ProcessingResult>,
    pub processed_payments: Vec<PaymentNotification>,
    pub failures: Vec<BatchFailure>,
}

impl BatchProcessingResult {
    /// Fold one item's outcome into the aggregate
    pub(crate) fn record(&mut self, payment: PaymentRecord, result: ProcessingResult) {
        self.total_processed += 1;
        if result.success {
            self.successful += 1;
            if let Some(stored) = &result.processed_payment {
                self.processed_payments.push(stored.clone());
            }
        } else {
            self.failed += 1;
            self.failures.push(BatchFailure {
                payment,
                error: result.message.clone(),
            });
        }
        self.results.push(result);
    }
}

// =========================================================================
// PaymentSummary
// =========================================================================

/// Totals of one student's payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub student_number: String,
    pub total_amount: Decimal,
    pub total_count: usize,
    pub last_payment_date: Option<NaiveDate>,
    pub average_amount: Decimal,
}
