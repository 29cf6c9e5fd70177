//! Account registry errors.

use thiserror::Error;
use tally_shared::types::AccountId;

/// Errors raised by chart of accounts rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// The type string is not one of the reportable types.
    #[error("Unknown account type: {0}")]
    UnknownType(String),

    /// Account still has children or ledger lines.
    #[error("Cannot delete account with {reason}")]
    InUse {
        /// What still references the account.
        reason: &'static str,
    },

    /// Parent account does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Re-parenting would make the account its own ancestor.
    #[error("Account {0} cannot be placed under one of its descendants")]
    ParentCycle(AccountId),

    /// No accounts receivable account could be resolved.
    #[error("Accounts Receivable account not found. Please create an AR account first.")]
    ReceivableNotConfigured,

    /// No cash-equivalent account could be resolved for the payment method.
    #[error("No cash account found for payment method '{0}'. Please create a cash account first.")]
    CashNotConfigured(String),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => "UNKNOWN_ACCOUNT_TYPE",
            Self::InUse { .. } => "ACCOUNT_IN_USE",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentCycle(_) => "PARENT_CYCLE",
            Self::ReceivableNotConfigured | Self::CashNotConfigured(_) => "MISSING_CONFIGURATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::UnknownType(_) | Self::ParentNotFound(_) | Self::ParentCycle(_) => 422,
            Self::InUse { .. } => 409,
            Self::ReceivableNotConfigured | Self::CashNotConfigured(_) => 400,
        }
    }
}
