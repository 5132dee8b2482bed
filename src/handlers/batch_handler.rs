//! Batch Handler
//!
//! Runs the single-payment workflow over a list of notifications.

use crate::domain::{OperationContext, PaymentRecord};

use super::{BatchProcessingResult, PaymentProcessor, ProcessingResult};

/// Handler for payment batches
#[derive(Clone)]
pub struct BatchProcessor {
    processor: PaymentProcessor,
}

impl BatchProcessor {
    pub fn new(processor: PaymentProcessor) -> Self {
        Self { processor }
    }

    /// Process every record in order.
    ///
    /// Items are independent: a rejected or errored item is recorded as a
    /// failure and the batch carries on.
    pub async fn process_batch(
        &self,
        records: Vec<PaymentRecord>,
        context: &OperationContext,
    ) -> BatchProcessingResult {
        let mut batch = BatchProcessingResult::default();

        for record in records {
            let result = match self.processor.process_payment(&record, context).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(
                        payment_reference = %record.payment_reference,
                        error = %e,
                        "Batch item failed"
                    );
                    ProcessingResult::errored(format!("Processing failed: {}", e))
                }
            };
            batch.record(record, result);
        }

        tracing::info!(
            total = batch.total_processed,
            successful = batch.successful,
            failed = batch.failed,
            "Payment batch processed"
        );

        batch
    }
}
