//! Payment Handlers module
//!
//! Handlers that orchestrate payment operations over the storage traits.

mod batch_handler;
mod payment_handler;
mod results;
mod summary_handler;


pub use batch_handler::BatchProcessor;
pub use payment_handler::PaymentProcessor;
pub use results::*;
pub use summary_handler::PaymentSummaryService;
