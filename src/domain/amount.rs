//! Payment amount type
//!
//! Amount paid as it arrives from the banking partner. Decoding never fails:
//! a missing or unreadable amount is kept as such so the validation rules
//! can report it against that record instead of rejecting the whole request.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Default ceiling for a single payment (1 million)
pub const DEFAULT_MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest amount the `NUMERIC(12, 2)` column holds (9,999,999,999.99)
pub const STORED_AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Maximum decimal places (2)
pub const MAX_SCALE: u32 = 2;

/// PaymentAmount is the amount paid on an incoming record.
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use student_payments::domain::PaymentAmount;
///
/// let amount: PaymentAmount = "5000.00".parse().unwrap();
/// assert_eq!(amount.value(), Some(Decimal::new(5000, 0)));
/// assert!(amount.check(Decimal::new(10_000, 0)).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaymentAmount {
    /// Field absent, null or blank
    #[default]
    Missing,
    /// A decimal value, not yet checked against the rules
    Value(Decimal),
    /// Anything that does not read as a decimal, kept verbatim
    Unreadable(String),
}

/// Rules an amount can break
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is required")]
    Missing,

    #[error("Amount must be greater than zero (got {0})")]
    NotPositive(Decimal),

    #[error("Amount cannot have more than {MAX_SCALE} decimal places (got {0})")]
    TooManyDecimals(u32),

    #[error("Amount cannot exceed {max} (got {value})")]
    AboveCeiling { value: Decimal, max: Decimal },

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl PaymentAmount {
    /// The decimal value, if the amount was readable
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// Every rule the amount breaks, in rule order.
    ///
    /// An absent or unreadable amount reports only that.
    pub fn check(&self, max: Decimal) -> Vec<AmountError> {
        let value = match self {
            Self::Missing => return vec![AmountError::Missing],
            Self::Unreadable(raw) => return vec![AmountError::ParseError(raw.clone())],
            Self::Value(value) => *value,
        };

        let mut errors = Vec::new();

        if value <= Decimal::ZERO {
            errors.push(AmountError::NotPositive(value));
        }

        if value > max {
            errors.push(AmountError::AboveCeiling { value, max });
        }

        // 10.50 and 10.500 are the same amount; only significant digits count
        let scale = value.normalize().scale();
        if scale > MAX_SCALE {
            errors.push(AmountError::TooManyDecimals(scale));
        }

        errors
    }

    fn read(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Missing;
        }
        text.parse().unwrap_or_else(|_| Self::Unreadable(text.to_string()))
    }
}

impl From<Decimal> for PaymentAmount {
    fn from(value: Decimal) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("<missing>"),
            Self::Value(value) => write!(f, "{}", value),
            Self::Unreadable(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for PaymentAmount {
    type Err = AmountError;

    /// Plain (`"12.50"`) or scientific (`"1.25e1"`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self::Value)
            .map_err(|e| AmountError::ParseError(e.to_string()))
    }
}

impl Serialize for PaymentAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Value(value) => Serialize::serialize(value, serializer),
            Self::Unreadable(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentAmount {
    /// Accepts JSON strings and numbers; anything else is unreadable.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Null => Self::Missing,
            serde_json::Value::String(text) => Self::read(&text),
            serde_json::Value::Number(number) => Self::read(&number.to_string()),
            other => Self::Unreadable(other.to_string()),
        })
    }
}
