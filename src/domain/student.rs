//! Student records
//!
//! Students are created by administrative action and referenced (never owned)
//! by payments through their student number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student as held in the student register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: Uuid,
    pub student_number: String,
    pub full_name: String,
    pub program: String,
    pub is_active: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub student_number: String,
    pub full_name: String,
    pub program: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewStudent {
    pub fn new(student_number: impl Into<String>, full_name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            student_number: student_number.into(),
            full_name: full_name.into(),
            program: program.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Build the stored record. New students start active.
    pub fn into_student(self) -> Student {
        let now = Utc::now();
        Student {
            id: Uuid::new_v4(),
            student_number: self.student_number,
            full_name: self.full_name,
            program: self.program,
            is_active: true,
            email: self.email,
            phone: self.phone,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_student_starts_active() {
        let student = NewStudent::new("S12345", "Ada Lovelace", "Mathematics")
            .with_email("ada@uni.example")
            .into_student();

        assert!(student.is_active);
        assert_eq!(student.student_number, "S12345");
        assert_eq!(student.email.as_deref(), Some("ada@uni.example"));
        assert!(student.phone.is_none());
    }
}
