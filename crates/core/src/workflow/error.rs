//! Workflow error types for transaction lifecycle management.

use thiserror::Error;

use crate::workflow::types::{GuardedOperation, TransactionStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// Operation is not allowed in the current status.
    #[error("{}", .operation.refusal())]
    ImmutableState {
        /// What was attempted.
        operation: GuardedOperation,
        /// The status that refused it.
        status: TransactionStatus,
    },

    /// Status change not reachable through an edit.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: TransactionStatus,
        /// The attempted target status.
        to: TransactionStatus,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,
}

impl WorkflowError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ImmutableState { .. } => "IMMUTABLE_STATE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ImmutableState { .. } => 403,
            Self::InvalidTransition { .. } | Self::RejectionReasonRequired => 422,
        }
    }
}
