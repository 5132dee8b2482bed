//! Payment Events
//!
//! Facts emitted after a payment is processed. They are handed to an
//! `EventSink` on a fire-and-forget basis.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentEvent {
    /// Payment was stored
    PaymentProcessed {
        payment_id: Uuid,
        payment_reference: String,
        student_number: String,
        amount: Decimal,
        processed_at: DateTime<Utc>,
    },

    /// Payment was rejected by a business rule
    PaymentFailed {
        payment_reference: String,
        student_number: String,
        reason_code: String,
        message: String,
        failed_at: DateTime<Utc>,
    },

    /// Payment failed the field validation rules
    ValidationFailed {
        payment_reference: String,
        student_number: String,
        errors: Vec<String>,
        failed_at: DateTime<Utc>,
    },
}

impl PaymentEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::PaymentProcessed { .. } => "PaymentProcessed",
            PaymentEvent::PaymentFailed { .. } => "PaymentFailed",
            PaymentEvent::ValidationFailed { .. } => "ValidationFailed",
        }
    }

    /// Get the payment reference this event relates to
    pub fn payment_reference(&self) -> &str {
        match self {
            PaymentEvent::PaymentProcessed { payment_reference, .. } => payment_reference,
            PaymentEvent::PaymentFailed { payment_reference, .. } => payment_reference,
            PaymentEvent::ValidationFailed { payment_reference, .. } => payment_reference,
        }
    }
}
