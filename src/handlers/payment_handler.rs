//! Payment Handler
//!
//! Validates, checks and stores a single payment notification.

use std::sync::Arc;

use chrono::Utc;

use crate::config::{InactiveStudentPolicy, PaymentRules};
use crate::domain::{DomainError, OperationContext, PaymentEvent, PaymentNotification, PaymentRecord, Student};
use crate::error::AppError;
use crate::events::EventSink;
use crate::storage::{PaymentStore, StorageError, StudentDirectory};
use crate::validation::{PaymentValidator, ValidationOutcome};

use super::ProcessingResult;

const INACTIVE_STUDENT_WARNING: &str = "Student is inactive";

/// Handler for single payment notifications
#[derive(Clone)]
pub struct PaymentProcessor {
    validator: PaymentValidator,
    students: Arc<dyn StudentDirectory>,
    payments: Arc<dyn PaymentStore>,
    events: Arc<dyn EventSink>,
}

impl PaymentProcessor {
    pub fn new(
        rules: PaymentRules,
        students: Arc<dyn StudentDirectory>,
        payments: Arc<dyn PaymentStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            validator: PaymentValidator::new(rules),
            students,
            payments,
            events,
        }
    }

    /// Run the field validation rules only
    pub fn validate_payment(&self, record: &PaymentRecord) -> ValidationOutcome {
        self.validator.validate(record)
    }

    /// Process one payment notification.
    ///
    /// Business rejections come back as an unsuccessful `ProcessingResult`;
    /// only storage failures are returned as `Err`.
    pub async fn process_payment(
        &self,
        record: &PaymentRecord,
        context: &OperationContext,
    ) -> Result<ProcessingResult, AppError> {
        let validation = self.validate_payment(record);
        if !validation.is_valid {
            tracing::info!(
                payment_reference = %record.payment_reference,
                errors = ?validation.errors,
                "Payment failed validation"
            );
            self.publish(
                PaymentEvent::ValidationFailed {
                    payment_reference: record.payment_reference.clone(),
                    student_number: record.student_number.clone(),
                    errors: validation.errors.clone(),
                    failed_at: Utc::now(),
                },
                context,
            )
            .await;
            return Ok(ProcessingResult::rejected(
                &DomainError::ValidationFailed(validation.errors),
                None,
            ));
        }

        // Duplicate check comes first and skips the lookup and the write
        if self.payments.exists_by_reference(&record.payment_reference).await? {
            let reason = DomainError::duplicate_reference(&record.payment_reference);
            return Ok(self.reject(record, reason, None, context).await);
        }

        let student = match self.students.find_by_number(&record.student_number).await? {
            Some(student) => student,
            None => {
                let reason = DomainError::StudentNotFound(record.student_number.clone());
                return Ok(self.reject(record, reason, None, context).await);
            }
        };

        let mut warnings = Vec::new();
        if !student.is_active {
            match self.validator.rules().inactive_student_policy {
                InactiveStudentPolicy::Accept => warnings.push(INACTIVE_STUDENT_WARNING.to_string()),
                InactiveStudentPolicy::Reject => {
                    let reason = DomainError::StudentInactive(student.student_number.clone());
                    return Ok(self.reject(record, reason, Some(&student), context).await);
                }
            }
        }

        let Some(payment) = PaymentNotification::from_record(record) else {
            // Validation guarantees a readable amount and payment date
            return Err(AppError::Internal(
                "Validated payment has no amount or payment date".to_string(),
            ));
        };

        match self.payments.insert(&payment).await {
            Ok(()) => {}
            Err(StorageError::DuplicateReference(reference)) => {
                // Lost the race against a concurrent submission
                let reason = DomainError::duplicate_reference(reference);
                return Ok(self.reject(record, reason, Some(&student), context).await);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            payment_id = %payment.id,
            payment_reference = %payment.payment_reference,
            student_number = %payment.student_number,
            amount = %payment.amount_paid,
            "Payment processed"
        );

        self.publish(
            PaymentEvent::PaymentProcessed {
                payment_id: payment.id,
                payment_reference: payment.payment_reference.clone(),
                student_number: payment.student_number.clone(),
                amount: payment.amount_paid,
                processed_at: payment.date_received,
            },
            context,
        )
        .await;

        Ok(ProcessingResult::accepted(payment, &student, warnings))
    }

    async fn reject(
        &self,
        record: &PaymentRecord,
        reason: DomainError,
        student: Option<&Student>,
        context: &OperationContext,
    ) -> ProcessingResult {
        tracing::info!(
            payment_reference = %record.payment_reference,
            student_number = %record.student_number,
            reason = reason.code(),
            "Payment rejected"
        );

        self.publish(
            PaymentEvent::PaymentFailed {
                payment_reference: record.payment_reference.clone(),
                student_number: record.student_number.clone(),
                reason_code: reason.code().to_string(),
                message: reason.to_string(),
                failed_at: Utc::now(),
            },
            context,
        )
        .await;

        ProcessingResult::rejected(&reason, student)
    }

    async fn publish(&self, event: PaymentEvent, context: &OperationContext) {
        if let Err(e) = self.events.publish(&event, context).await {
            tracing::warn!(
                event_type = event.event_type(),
                payment_reference = event.payment_reference(),
                error = %e,
                "Failed to publish payment event"
            );
        }
    }
}
