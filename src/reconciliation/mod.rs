//! Reconciliation module
//!
//! Matches bank statement records against stored payment notifications.

mod engine;

pub use engine::{ReconciliationEngine, ReconciliationResult};
