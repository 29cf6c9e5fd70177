//! Transaction lifecycle management for Tally.
//!
//! This module implements the transaction status state machine and the
//! status gates for editing, deleting, approving and rejecting.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (TransactionStatus, TransactionType, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{GuardedOperation, TransactionStatus, TransactionType, WorkflowAction};
