//! Payment notifications
//!
//! A `PaymentRecord` is what the banking partner sends us; a
//! `PaymentNotification` is the immutable stored form, created once per
//! payment reference.
//!
//! Records decode leniently: a wrong or missing field never fails the
//! request, it surfaces as a validation error on that record.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::PaymentAmount;

/// Incoming payment notification, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub student_number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_reference: String,
    #[serde(default)]
    pub amount_paid: PaymentAmount,
    #[serde(default)]
    pub payment_date: PaymentDate,
}

impl PaymentRecord {
    pub fn new(
        student_number: impl Into<String>,
        payment_reference: impl Into<String>,
        amount_paid: Decimal,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            student_number: student_number.into(),
            payment_reference: payment_reference.into(),
            amount_paid: amount_paid.into(),
            payment_date: payment_date.into(),
        }
    }
}

/// Payment date as received
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaymentDate {
    #[default]
    Missing,
    Value(NaiveDate),
    /// Not a `YYYY-MM-DD` calendar date, kept verbatim
    Unreadable(String),
}

impl PaymentDate {
    pub fn value(&self) -> Option<NaiveDate> {
        match self {
            Self::Value(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<NaiveDate> for PaymentDate {
    fn from(date: NaiveDate) -> Self {
        Self::Value(date)
    }
}

impl Serialize for PaymentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Value(date) => date.serialize(serializer),
            Self::Unreadable(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_text(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::Missing);
        }
        Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Self::Value)
            .unwrap_or_else(|_| Self::Unreadable(raw.to_string())))
    }
}

/// Any JSON scalar as text; `null` reads as empty.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Stored payment notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentNotification {
    pub id: Uuid,
    pub student_number: String,
    pub payment_reference: String,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    /// Assigned by the server on ingestion
    pub date_received: DateTime<Utc>,
}

impl PaymentNotification {
    /// Build the stored form of a validated record.
    ///
    /// Returns `None` when the record has no readable amount or payment
    /// date; validation rejects such records before they get here.
    pub fn from_record(record: &PaymentRecord) -> Option<Self> {
        Some(Self {
            id: Uuid::new_v4(),
            student_number: record.student_number.clone(),
            payment_reference: record.payment_reference.clone(),
            amount_paid: record.amount_paid.value()?,
            payment_date: record.payment_date.value()?,
            date_received: Utc::now(),
        })
    }
}
