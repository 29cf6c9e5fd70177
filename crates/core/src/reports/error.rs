//! Report error types.

use tally_shared::types::AccountId;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_) => 404,
        }
    }
}
