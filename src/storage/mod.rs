//! Storage module
//!
//! Repository traits the payment core depends on, with PostgreSQL
//! implementations for the server and in-memory ones for tests and local runs.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{PaymentNotification, Student};

pub use error::StorageError;
pub use memory::{MemoryApiKeyStore, MemoryPaymentStore, MemoryStudentDirectory};
pub use postgres::{PgApiKeyStore, PgPaymentStore, PgStudentDirectory};

pub type StorageResult<T> = Result<T, StorageError>;

/// Student register
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Get a student by student number
    async fn find_by_number(&self, student_number: &str) -> StorageResult<Option<Student>>;

    /// Register a student; the student number must be unused
    async fn insert(&self, student: &Student) -> StorageResult<()>;

    /// Change the active flag. Returns the updated student, or `None` if unknown.
    async fn set_active(&self, student_number: &str, is_active: bool) -> StorageResult<Option<Student>>;
}

/// Payment notification store
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Check whether a payment reference is already stored
    async fn exists_by_reference(&self, payment_reference: &str) -> StorageResult<bool>;

    /// Store a new payment.
    ///
    /// Fails with `StorageError::DuplicateReference` if the reference exists,
    /// even when a previous existence check said otherwise.
    async fn insert(&self, payment: &PaymentNotification) -> StorageResult<()>;

    /// Get the stored payments for a set of references
    async fn find_by_references(&self, references: &[String]) -> StorageResult<Vec<PaymentNotification>>;

    /// List payments of one student, most recent payment date first
    async fn find_by_student(&self, student_number: &str) -> StorageResult<Vec<PaymentNotification>>;

    /// List payments whose payment date lies in `[from, to]`
    async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> StorageResult<Vec<PaymentNotification>>;

    /// Sum of all amounts paid by one student
    async fn sum_by_student(&self, student_number: &str) -> StorageResult<Decimal>;
}

/// API key as stored (the key itself is never stored, only its hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub name: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
}

/// API key lookup for the authentication middleware
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn find_by_hash(&self, key_hash: &str) -> StorageResult<Option<ApiKeyRecord>>;
}
