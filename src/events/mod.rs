//! Payment Event Sinks
//!
//! Fire-and-forget delivery of payment events. Publishing failures are the
//! caller's to log; they never fail the payment operation itself.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::{OperationContext, PaymentEvent};

/// Errors that can occur while publishing an event
#[derive(Debug, thiserror::Error)]
pub enum EventSinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for payment events
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &PaymentEvent, context: &OperationContext) -> Result<(), EventSinkError>;
}

// =========================================================================
// Tracing sink
// =========================================================================

/// Emits each event as a structured log line
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: &PaymentEvent, context: &OperationContext) -> Result<(), EventSinkError> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(
            event_type = event.event_type(),
            payment_reference = event.payment_reference(),
            correlation_id = ?context.correlation_id,
            payload = %payload,
            "Payment event"
        );
        Ok(())
    }
}

// =========================================================================
// Outbox sink
// =========================================================================

/// Writes events into the `payment_events` outbox table, from where a
/// separate relay forwards them to the message bus.
#[derive(Debug, Clone)]
pub struct OutboxEventSink {
    pool: PgPool,
}

impl OutboxEventSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSink for OutboxEventSink {
    async fn publish(&self, event: &PaymentEvent, context: &OperationContext) -> Result<(), EventSinkError> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_value(event)?;

        sqlx::query(
            r#"
            INSERT INTO payment_events (id, event_type, payment_reference, payload,
                                        correlation_id, api_key_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(event.event_type())
        .bind(event.payment_reference())
        .bind(&payload)
        .bind(context.correlation_id)
        .bind(context.api_key_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            event_id = %id,
            event_type = event.event_type(),
            "Payment event written to outbox"
        );

        Ok(())
    }
}

// =========================================================================
// Memory sink
// =========================================================================

/// Keeps published events in memory; used by tests
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<PaymentEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far
    pub fn events(&self) -> Vec<PaymentEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, event: &PaymentEvent, _context: &OperationContext) -> Result<(), EventSinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
