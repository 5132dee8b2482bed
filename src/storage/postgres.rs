//! PostgreSQL repositories

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{PaymentNotification, Student};

use super::error::is_unique_violation;
use super::{ApiKeyRecord, ApiKeyStore, PaymentStore, StorageError, StorageResult, StudentDirectory};

// =========================================================================
// Students
// =========================================================================

/// Student register backed by the `students` table
#[derive(Debug, Clone)]
pub struct PgStudentDirectory {
    pool: PgPool,
}

impl PgStudentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentDirectory for PgStudentDirectory {
    async fn find_by_number(&self, student_number: &str) -> StorageResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_number, full_name, program, is_active, email, phone,
                   created_at, updated_at
            FROM students
            WHERE student_number = $1
            "#,
        )
        .bind(student_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn insert(&self, student: &Student) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO students (id, student_number, full_name, program, is_active, email, phone,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(student.id)
        .bind(&student.student_number)
        .bind(&student.full_name)
        .bind(&student.program)
        .bind(student.is_active)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.created_at)
        .bind(student.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::DuplicateStudent(student.student_number.clone())
            } else {
                StorageError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn set_active(&self, student_number: &str, is_active: bool) -> StorageResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET is_active = $2, updated_at = NOW()
            WHERE student_number = $1
            RETURNING id, student_number, full_name, program, is_active, email, phone,
                      created_at, updated_at
            "#,
        )
        .bind(student_number)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }
}

// =========================================================================
// Payments
// =========================================================================

/// Payment store backed by the `payment_notifications` table.
///
/// The unique index on `payment_reference` is what makes the
/// check-then-insert sequence safe under concurrent submissions.
#[derive(Debug, Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PAYMENT_COLUMNS: &str =
    "id, student_number, payment_reference, amount_paid, payment_date, date_received";

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn exists_by_reference(&self, payment_reference: &str) -> StorageResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM payment_notifications WHERE payment_reference = $1)",
        )
        .bind(payment_reference)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, payment: &PaymentNotification) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_notifications
                (id, student_number, payment_reference, amount_paid, payment_date, date_received)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payment.id)
        .bind(&payment.student_number)
        .bind(&payment.payment_reference)
        .bind(payment.amount_paid)
        .bind(payment.payment_date)
        .bind(payment.date_received)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::DuplicateReference(payment.payment_reference.clone())
            } else {
                StorageError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_by_references(&self, references: &[String]) -> StorageResult<Vec<PaymentNotification>> {
        if references.is_empty() {
            return Ok(Vec::new());
        }

        let payments = sqlx::query_as::<_, PaymentNotification>(&format!(
            "SELECT {} FROM payment_notifications WHERE payment_reference = ANY($1)",
            PAYMENT_COLUMNS
        ))
        .bind(references)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn find_by_student(&self, student_number: &str) -> StorageResult<Vec<PaymentNotification>> {
        let payments = sqlx::query_as::<_, PaymentNotification>(&format!(
            r#"
            SELECT {} FROM payment_notifications
            WHERE student_number = $1
            ORDER BY payment_date DESC, date_received DESC
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(student_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> StorageResult<Vec<PaymentNotification>> {
        let payments = sqlx::query_as::<_, PaymentNotification>(&format!(
            r#"
            SELECT {} FROM payment_notifications
            WHERE payment_date BETWEEN $1 AND $2
            ORDER BY payment_date ASC, payment_reference ASC
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn sum_by_student(&self, student_number: &str) -> StorageResult<Decimal> {
        let total: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(amount_paid) FROM payment_notifications WHERE student_number = $1",
        )
        .bind(student_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or_default())
    }
}

// =========================================================================
// API keys
// =========================================================================

/// API key lookup backed by the `api_keys` table
#[derive(Debug, Clone)]
pub struct PgApiKeyStore {
    pool: PgPool,
}

impl PgApiKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PgApiKeyStore {
    async fn find_by_hash(&self, key_hash: &str) -> StorageResult<Option<ApiKeyRecord>> {
        let record: Option<(Uuid, String, Vec<String>, bool)> = sqlx::query_as(
            r#"
            SELECT id, name, permissions, is_active
            FROM api_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(|(id, name, permissions, is_active)| ApiKeyRecord {
            id,
            name,
            permissions,
            is_active,
        }))
    }
}
