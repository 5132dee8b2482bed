//! Domain Error Types
//!
//! Business outcomes that reject a payment. These are returned inside
//! processing results, never raised to the HTTP layer as faults.

use thiserror::Error;

/// Reasons a payment is not accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed the validation rules
    #[error("Payment validation failed")]
    ValidationFailed(Vec<String>),

    /// The payment reference is already stored
    #[error("Payment reference already exists: {reference}")]
    DuplicateReference { reference: String },

    /// No student with this number
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// Student exists but is inactive and the policy rejects such payments
    #[error("Student is inactive: {0}")]
    StudentInactive(String),
}

impl DomainError {
    /// Create a duplicate reference error
    pub fn duplicate_reference(reference: impl Into<String>) -> Self {
        Self::DuplicateReference {
            reference: reference.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "validation_failed",
            Self::DuplicateReference { .. } => "duplicate_reference",
            Self::StudentNotFound(_) => "student_not_found",
            Self::StudentInactive(_) => "student_inactive",
        }
    }

    /// Field-level errors, if this is a validation failure
    pub fn validation_errors(&self) -> &[String] {
        match self {
            Self::ValidationFailed(errors) => errors,
            _ => &[],
        }
    }
}
