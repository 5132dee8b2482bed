//! Payment Validation Rules
//!
//! Field-level checks on an incoming payment record. Every check runs and
//! errors accumulate, so the caller sees all problems in one response.

use chrono::{Months, NaiveDate, Utc};
use serde::Serialize;

use crate::config::PaymentRules;
use crate::domain::{AmountError, PaymentDate, PaymentRecord};

/// Outcome of running the validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validator holding the configured rule set
#[derive(Debug, Clone, Default)]
pub struct PaymentValidator {
    rules: PaymentRules,
}

impl PaymentValidator {
    pub fn new(rules: PaymentRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PaymentRules {
        &self.rules
    }

    /// Validate a payment record against today's date (UTC)
    pub fn validate(&self, record: &PaymentRecord) -> ValidationOutcome {
        self.validate_at(record, Utc::now().date_naive())
    }

    /// Validate a payment record as if today were `today`
    pub fn validate_at(&self, record: &PaymentRecord, today: NaiveDate) -> ValidationOutcome {
        let mut errors = Vec::new();

        self.check_student_number(&record.student_number, &mut errors);
        self.check_reference(&record.payment_reference, &mut errors);
        self.check_amount(record, &mut errors);
        self.check_payment_date(&record.payment_date, today, &mut errors);

        ValidationOutcome::from_errors(errors)
    }

    fn check_student_number(&self, student_number: &str, errors: &mut Vec<String>) {
        if student_number.trim().is_empty() {
            errors.push("Student number is required".to_string());
            return;
        }

        let (min, max) = (
            self.rules.student_number_min_len,
            self.rules.student_number_max_len,
        );
        let len = student_number.chars().count();
        if len < min || len > max {
            errors.push(format!(
                "Student number must be between {} and {} characters",
                min, max
            ));
        }

        if !student_number
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            errors.push(
                "Student number may only contain uppercase letters and digits".to_string(),
            );
        }
    }

    fn check_reference(&self, reference: &str, errors: &mut Vec<String>) {
        if reference.trim().is_empty() {
            errors.push("Payment reference is required".to_string());
            return;
        }

        let (min, max) = (self.rules.reference_min_len, self.rules.reference_max_len);
        let len = reference.chars().count();
        if len < min || len > max {
            errors.push(format!(
                "Payment reference must be between {} and {} characters",
                min, max
            ));
        }

        if !reference
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            errors.push(
                "Payment reference may only contain uppercase letters, digits, hyphens and underscores"
                    .to_string(),
            );
        }
    }

    fn check_amount(&self, record: &PaymentRecord, errors: &mut Vec<String>) {
        for err in record.amount_paid.check(self.rules.max_amount) {
            let message = match err {
                AmountError::Missing => "Amount paid is required".to_string(),
                AmountError::NotPositive(_) => "Amount paid must be greater than zero".to_string(),
                AmountError::AboveCeiling { max, .. } => {
                    format!("Amount paid cannot exceed {}", max)
                }
                AmountError::TooManyDecimals(_) => {
                    "Amount paid cannot have more than 2 decimal places".to_string()
                }
                AmountError::ParseError(raw) => format!("Amount paid is not a number: {}", raw),
            };
            errors.push(message);
        }
    }

    fn check_payment_date(
        &self,
        payment_date: &PaymentDate,
        today: NaiveDate,
        errors: &mut Vec<String>,
    ) {
        let date = match payment_date {
            PaymentDate::Value(date) => *date,
            PaymentDate::Missing => {
                errors.push("Payment date is required".to_string());
                return;
            }
            PaymentDate::Unreadable(raw) => {
                errors.push(format!("Payment date is not a valid date (YYYY-MM-DD): {}", raw));
                return;
            }
        };

        if date > today {
            errors.push("Payment date cannot be in the future".to_string());
        }

        let earliest = today
            .checked_sub_months(Months::new(self.rules.lookback_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        if date < earliest {
            errors.push(format!(
                "Payment date cannot be more than {} years in the past",
                self.rules.lookback_years
            ));
        }
    }
}

/// Validate a record with the default rule set
pub fn validate_payment(record: &PaymentRecord) -> ValidationOutcome {
    PaymentValidator::default().validate(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentAmount;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn valid_record() -> PaymentRecord {
        PaymentRecord::new("S12345", "REF001", dec!(5000.00), today().pred_opt().unwrap())
    }

    fn validate(record: &PaymentRecord) -> ValidationOutcome {
        PaymentValidator::default().validate_at(record, today())
    }

    #[test]
    fn test_valid_record() {
        let outcome = validate(&valid_record());
        assert!(outcome.is_valid, "{:?}", outcome.errors);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_payment_today_is_valid() {
        let record = PaymentRecord {
            payment_date: today().into(),
            ..valid_record()
        };
        assert!(validate(&record).is_valid);
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        for amount in [Decimal::ZERO, dec!(-0.01), dec!(-5000)] {
            let record = PaymentRecord {
                amount_paid: amount.into(),
                ..valid_record()
            };
            let outcome = validate(&record);
            assert!(!outcome.is_valid);
            assert!(outcome.errors.iter().any(|e| e.contains("Amount paid")));
        }
    }

    #[test]
    fn test_amount_ceiling_and_precision() {
        let record = PaymentRecord {
            amount_paid: dec!(1000000.01).into(),
            ..valid_record()
        };
        assert!(validate(&record).errors.iter().any(|e| e.contains("cannot exceed")));

        let record = PaymentRecord {
            amount_paid: dec!(10.001).into(),
            ..valid_record()
        };
        assert_eq!(
            validate(&record).errors,
            vec!["Amount paid cannot have more than 2 decimal places".to_string()]
        );
    }

    #[test]
    fn test_future_date_rejected() {
        let record = PaymentRecord {
            payment_date: today().succ_opt().unwrap().into(),
            ..valid_record()
        };
        let outcome = validate(&record);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors, vec!["Payment date cannot be in the future".to_string()]);
    }

    #[test]
    fn test_lookback_window() {
        let just_inside = NaiveDate::from_ymd_opt(2016, 6, 15).unwrap();
        let just_outside = NaiveDate::from_ymd_opt(2016, 6, 14).unwrap();

        let inside = PaymentRecord {
            payment_date: just_inside.into(),
            ..valid_record()
        };
        assert!(validate(&inside).is_valid);

        let outside = PaymentRecord {
            payment_date: just_outside.into(),
            ..valid_record()
        };
        assert!(validate(&outside).errors[0].contains("10 years"));
    }

    #[test]
    fn test_missing_date_rejected() {
        let record = PaymentRecord {
            payment_date: PaymentDate::Missing,
            ..valid_record()
        };
        assert_eq!(validate(&record).errors, vec!["Payment date is required".to_string()]);
    }

    #[test]
    fn test_short_numeric_reference_rejected() {
        let record = PaymentRecord {
            payment_reference: "123".to_string(),
            ..valid_record()
        };
        let outcome = validate(&record);
        assert!(!outcome.is_valid);
        assert!(outcome.errors[0].starts_with("Payment reference must be between 5 and 50"));
    }

    #[test]
    fn test_reference_charset() {
        let record = PaymentRecord {
            payment_reference: "ref-001".to_string(),
            ..valid_record()
        };
        let outcome = validate(&record);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("uppercase letters, digits, hyphens and underscores"));

        let record = PaymentRecord {
            payment_reference: "BANK_REF-2026-0001".to_string(),
            ..valid_record()
        };
        assert!(validate(&record).is_valid);
    }

    #[test]
    fn test_student_number_rules() {
        let record = PaymentRecord {
            student_number: "s1".to_string(),
            ..valid_record()
        };
        let outcome = validate(&record);
        assert_eq!(outcome.errors.len(), 2);

        let record = PaymentRecord {
            student_number: "   ".to_string(),
            ..valid_record()
        };
        assert_eq!(validate(&record).errors, vec!["Student number is required".to_string()]);
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let record = PaymentRecord {
            student_number: String::new(),
            payment_reference: String::new(),
            amount_paid: Decimal::ZERO.into(),
            payment_date: PaymentDate::Missing,
        };
        let outcome = validate(&record);
        assert_eq!(
            outcome.errors,
            vec![
                "Student number is required".to_string(),
                "Payment reference is required".to_string(),
                "Amount paid must be greater than zero".to_string(),
                "Payment date is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_configured_lookback_is_honoured() {
        let rules = PaymentRules {
            lookback_years: 5,
            ..PaymentRules::default()
        };
        let record = PaymentRecord {
            payment_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().into(),
            ..valid_record()
        };
        let outcome = PaymentValidator::new(rules).validate_at(&record, today());
        assert!(outcome.errors[0].contains("5 years"));
    }

    #[test]
    fn test_validate_payment_uses_current_date() {
        let record = PaymentRecord::new("S12345", "REF001", dec!(10), Utc::now().date_naive());
        assert!(validate_payment(&record).is_valid);
    }

    #[test]
    fn test_unreadable_fields_become_errors() {
        let record: PaymentRecord = serde_json::from_str(
            r#"{"payment_reference": "REF002", "amount_paid": "abc", "payment_date": "yesterday"}"#,
        )
        .unwrap();

        assert_eq!(
            validate(&record).errors,
            vec![
                "Student number is required".to_string(),
                "Amount paid is not a number: abc".to_string(),
                "Payment date is not a valid date (YYYY-MM-DD): yesterday".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_amount_rejected() {
        let record = PaymentRecord {
            amount_paid: PaymentAmount::Missing,
            ..valid_record()
        };
        assert_eq!(validate(&record).errors, vec!["Amount paid is required".to_string()]);
    }

    #[test]
    fn test_reference_length_bounds() {
        for (len, valid) in [(4, false), (5, true), (50, true), (51, false)] {
            let record = PaymentRecord {
                payment_reference: "R".repeat(len),
                ..valid_record()
            };
            let outcome = validate(&record);
            assert_eq!(outcome.is_valid, valid, "reference of {} characters", len);
            if !valid {
                assert_eq!(
                    outcome.errors,
                    vec!["Payment reference must be between 5 and 50 characters".to_string()]
                );
            }
        }
    }

    #[test]
    fn test_student_number_length_bounds() {
        for (len, valid) in [(4, false), (5, true), (20, true), (21, false)] {
            let record = PaymentRecord {
                student_number: "S".repeat(len),
                ..valid_record()
            };
            let outcome = validate(&record);
            assert_eq!(outcome.is_valid, valid, "student number of {} characters", len);
            if !valid {
                assert_eq!(
                    outcome.errors,
                    vec!["Student number must be between 5 and 20 characters".to_string()]
                );
            }
        }
    }

    #[test]
    fn test_amount_at_ceiling_is_valid() {
        let record = PaymentRecord {
            amount_paid: dec!(1000000.00).into(),
            ..valid_record()
        };
        assert!(validate(&record).is_valid);

        let record = PaymentRecord {
            amount_paid: dec!(0.01).into(),
            ..valid_record()
        };
        assert!(validate(&record).is_valid);
    }
}
