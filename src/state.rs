//! Application state
//!
//! Shared handles passed to every request. Nothing here is mutable; the
//! storage handles manage their own synchronisation.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{Config, EventSinkKind, PaymentRules};
use crate::events::{EventSink, OutboxEventSink, TracingEventSink};
use crate::handlers::{BatchProcessor, PaymentProcessor, PaymentSummaryService};
use crate::reconciliation::ReconciliationEngine;
use crate::storage::{
    ApiKeyStore, PaymentStore, PgApiKeyStore, PgPaymentStore, PgStudentDirectory, StudentDirectory,
};

/// Default largest batch accepted in one request
const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentDirectory>,
    pub payments: Arc<dyn PaymentStore>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub events: Arc<dyn EventSink>,
    pub rules: PaymentRules,
    pub max_batch_size: usize,
}

impl AppState {
    pub fn new(
        students: Arc<dyn StudentDirectory>,
        payments: Arc<dyn PaymentStore>,
        api_keys: Arc<dyn ApiKeyStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            students,
            payments,
            api_keys,
            events,
            rules: PaymentRules::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// State backed by PostgreSQL, configured from `config`
    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        let events: Arc<dyn EventSink> = match config.event_sink {
            EventSinkKind::Outbox => Arc::new(OutboxEventSink::new(pool.clone())),
            EventSinkKind::Log => Arc::new(TracingEventSink),
        };

        Self::new(
            Arc::new(PgStudentDirectory::new(pool.clone())),
            Arc::new(PgPaymentStore::new(pool.clone())),
            Arc::new(PgApiKeyStore::new(pool)),
            events,
        )
        .with_rules(config.rules.clone())
        .with_max_batch_size(config.max_batch_size)
    }

    pub fn with_rules(mut self, rules: PaymentRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn payment_processor(&self) -> PaymentProcessor {
        PaymentProcessor::new(
            self.rules.clone(),
            self.students.clone(),
            self.payments.clone(),
            self.events.clone(),
        )
    }

    pub fn batch_processor(&self) -> BatchProcessor {
        BatchProcessor::new(self.payment_processor())
    }

    pub fn reconciliation_engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(self.payments.clone())
    }

    pub fn summary_service(&self) -> PaymentSummaryService {
        PaymentSummaryService::new(self.payments.clone())
    }
}
