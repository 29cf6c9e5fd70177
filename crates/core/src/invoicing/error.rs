//! Invoice error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::InvoiceStatus;
use crate::accounts::AccountError;
use crate::ledger::LedgerError;

/// Errors raised by invoice rules and the invoice-to-ledger bridge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// Invoice already has a generated transaction.
    #[error("Invoice already finalized")]
    AlreadyFinalized,

    /// Payment recorded before the invoice was booked.
    #[error("Invoice must be finalized before recording payments")]
    NotFinalized,

    /// Action requires a draft invoice.
    #[error("Can only {action} draft invoices (status is {status})")]
    NotDraft {
        /// What was attempted.
        action: &'static str,
        /// Current status.
        status: InvoiceStatus,
    },

    /// Payment larger than the outstanding balance.
    #[error("Payment amount {amount} exceeds invoice balance {balance}")]
    PaymentExceedsBalance {
        /// Requested payment.
        amount: Decimal,
        /// Outstanding balance.
        balance: Decimal,
    },

    /// Payment amount is zero or negative.
    #[error("Payment amount must be at least 0.01")]
    InvalidPaymentAmount,

    /// Invoice has no lines.
    #[error("Invoice must have at least one item")]
    NoLines,

    /// Line quantity or price out of range.
    #[error("Item {index}: {reason}")]
    InvalidLine {
        /// Zero-based line position.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Due date before the invoice date.
    #[error("Due date must be on or after the invoice date")]
    DueBeforeIssue,

    /// Account resolution failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The generated posting failed ledger validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyFinalized => "ONE_TIME_OPERATION",
            Self::NotFinalized => "INVOICE_NOT_FINALIZED",
            Self::NotDraft { .. } => "IMMUTABLE_STATE",
            Self::PaymentExceedsBalance { .. } => "PAYMENT_EXCEEDS_BALANCE",
            Self::InvalidPaymentAmount
            | Self::NoLines
            | Self::InvalidLine { .. }
            | Self::DueBeforeIssue => "VALIDATION_ERROR",
            Self::Account(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyFinalized | Self::NotFinalized | Self::PaymentExceedsBalance { .. } => 400,
            Self::NotDraft { .. } => 403,
            Self::InvalidPaymentAmount
            | Self::NoLines
            | Self::InvalidLine { .. }
            | Self::DueBeforeIssue => 422,
            Self::Account(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
        }
    }
}
