//! Student Payments Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod events;
pub mod handlers;
pub mod reconciliation;
pub mod state;
pub mod storage;
pub mod validation;

mod error;

pub use config::{Config, InactiveStudentPolicy, PaymentRules};
pub use domain::{BankPaymentData, DomainError, PaymentNotification, PaymentRecord, Student};
pub use error::{AppError, AppResult};
pub use state::AppState;
pub use validation::{validate_payment, PaymentValidator, ValidationOutcome};
