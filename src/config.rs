//! Configuration module
//!
//! Loads configuration from environment variables.

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::domain::{DEFAULT_MAX_AMOUNT, STORED_AMOUNT_LIMIT};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Payment acceptance rules
    pub rules: PaymentRules,

    /// Largest batch accepted in one request
    pub max_batch_size: usize,

    /// Where payment events go
    pub event_sink: EventSinkKind,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", "10")?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", "3000")?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let defaults = PaymentRules::default();
        let rules = PaymentRules {
            max_amount: check_max_amount(parse_env(
                "PAYMENT_MAX_AMOUNT",
                &defaults.max_amount.to_string(),
            )?)?,
            lookback_years: parse_env(
                "PAYMENT_LOOKBACK_YEARS",
                &defaults.lookback_years.to_string(),
            )?,
            inactive_student_policy: parse_env("INACTIVE_STUDENT_POLICY", "accept")?,
            ..defaults
        };

        let max_batch_size = parse_env("MAX_BATCH_SIZE", "1000")?;

        let event_sink = parse_env("EVENT_SINK", "outbox")?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            rules,
            max_batch_size,
            event_sink,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// The ceiling must be positive and storable in `amount_paid`
fn check_max_amount(max: Decimal) -> Result<Decimal, ConfigError> {
    if max <= Decimal::ZERO || max > STORED_AMOUNT_LIMIT {
        return Err(ConfigError::InvalidValue("PAYMENT_MAX_AMOUNT"));
    }
    Ok(max)
}

fn parse_env<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name))
}

/// What to do with a payment for a student who exists but is inactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InactiveStudentPolicy {
    /// Store the payment and attach a warning
    #[default]
    Accept,
    /// Reject the payment
    Reject,
}

impl FromStr for InactiveStudentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            _ => Err(ConfigError::InvalidValue("INACTIVE_STUDENT_POLICY")),
        }
    }
}

/// Which event sink receives payment events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSinkKind {
    /// `payment_events` outbox table
    Outbox,
    /// Structured log lines only
    Log,
}

impl FromStr for EventSinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outbox" => Ok(Self::Outbox),
            "log" => Ok(Self::Log),
            _ => Err(ConfigError::InvalidValue("EVENT_SINK")),
        }
    }
}

/// Limits applied to incoming payment notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRules {
    pub student_number_min_len: usize,
    pub student_number_max_len: usize,
    pub reference_min_len: usize,
    pub reference_max_len: usize,
    pub max_amount: Decimal,
    /// How far back a payment date may lie
    pub lookback_years: u32,
    pub inactive_student_policy: InactiveStudentPolicy,
}

impl Default for PaymentRules {
    fn default() -> Self {
        Self {
            student_number_min_len: 5,
            student_number_max_len: 20,
            reference_min_len: 5,
            reference_max_len: 50,
            max_amount: DEFAULT_MAX_AMOUNT,
            lookback_years: 10,
            inactive_student_policy: InactiveStudentPolicy::Accept,
        }
    }
}

impl PaymentRules {
    pub fn with_inactive_student_policy(mut self, policy: InactiveStudentPolicy) -> Self {
        self.inactive_student_policy = policy;
        self
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
