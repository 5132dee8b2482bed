//! In-memory repositories for tests and local development

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{PaymentNotification, Student};

use super::{ApiKeyRecord, ApiKeyStore, PaymentStore, StorageError, StorageResult, StudentDirectory};

/// In-memory student register
#[derive(Debug, Clone, Default)]
pub struct MemoryStudentDirectory {
    students: Arc<RwLock<HashMap<String, Student>>>,
}

impl MemoryStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a set of students
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let map = students
            .into_iter()
            .map(|s| (s.student_number.clone(), s))
            .collect();
        Self {
            students: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl StudentDirectory for MemoryStudentDirectory {
    async fn find_by_number(&self, student_number: &str) -> StorageResult<Option<Student>> {
        Ok(self.students.read().unwrap().get(student_number).cloned())
    }

    async fn insert(&self, student: &Student) -> StorageResult<()> {
        let mut students = self.students.write().unwrap();
        if students.contains_key(&student.student_number) {
            return Err(StorageError::DuplicateStudent(student.student_number.clone()));
        }
        students.insert(student.student_number.clone(), student.clone());
        Ok(())
    }

    async fn set_active(&self, student_number: &str, is_active: bool) -> StorageResult<Option<Student>> {
        let mut students = self.students.write().unwrap();
        Ok(students.get_mut(student_number).map(|student| {
            student.is_active = is_active;
            student.updated_at = Utc::now();
            student.clone()
        }))
    }
}

/// In-memory payment store; insertion order is preserved
#[derive(Debug, Clone, Default)]
pub struct MemoryPaymentStore {
    payments: Arc<RwLock<Vec<PaymentNotification>>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments
    pub fn len(&self) -> usize {
        self.payments.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn exists_by_reference(&self, payment_reference: &str) -> StorageResult<bool> {
        Ok(self
            .payments
            .read()
            .unwrap()
            .iter()
            .any(|p| p.payment_reference == payment_reference))
    }

    async fn insert(&self, payment: &PaymentNotification) -> StorageResult<()> {
        // Check and push under one write lock, like a unique index would
        let mut payments = self.payments.write().unwrap();
        if payments
            .iter()
            .any(|p| p.payment_reference == payment.payment_reference)
        {
            return Err(StorageError::DuplicateReference(payment.payment_reference.clone()));
        }
        payments.push(payment.clone());
        Ok(())
    }

    async fn find_by_references(&self, references: &[String]) -> StorageResult<Vec<PaymentNotification>> {
        Ok(self
            .payments
            .read()
            .unwrap()
            .iter()
            .filter(|p| references.contains(&p.payment_reference))
            .cloned()
            .collect())
    }

    async fn find_by_student(&self, student_number: &str) -> StorageResult<Vec<PaymentNotification>> {
        let mut payments: Vec<PaymentNotification> = self
            .payments
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.student_number == student_number)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then(b.date_received.cmp(&a.date_received))
        });
        Ok(payments)
    }

    async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> StorageResult<Vec<PaymentNotification>> {
        let mut payments: Vec<PaymentNotification> = self
            .payments
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.payment_date >= from && p.payment_date <= to)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            a.payment_date
                .cmp(&b.payment_date)
                .then_with(|| a.payment_reference.cmp(&b.payment_reference))
        });
        Ok(payments)
    }

    async fn sum_by_student(&self, student_number: &str) -> StorageResult<Decimal> {
        Ok(self
            .payments
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.student_number == student_number)
            .map(|p| p.amount_paid)
            .sum())
    }
}

/// In-memory API key store, keyed by key hash
#[derive(Debug, Clone, Default)]
pub struct MemoryApiKeyStore {
    keys: Arc<RwLock<HashMap<String, ApiKeyRecord>>>,
}

impl MemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key_hash: impl Into<String>, record: ApiKeyRecord) {
        self.keys.write().unwrap().insert(key_hash.into(), record);
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    async fn find_by_hash(&self, key_hash: &str) -> StorageResult<Option<ApiKeyRecord>> {
        Ok(self.keys.read().unwrap().get(key_hash).cloned())
    }
}
