//! Domain module
//!
//! Core domain types for students, payments and bank statements.

pub mod amount;
pub mod bank;
pub mod context;
pub mod error;
pub mod events;
pub mod payment;
pub mod student;

pub use amount::{AmountError, PaymentAmount, DEFAULT_MAX_AMOUNT, STORED_AMOUNT_LIMIT};
pub use bank::BankPaymentData;
pub use context::OperationContext;
pub use error::DomainError;
pub use events::PaymentEvent;
pub use payment::{PaymentDate, PaymentNotification, PaymentRecord};
pub use student::{NewStudent, Student};
