//! Ledger error types for entry validation.

use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use thiserror::Error;

/// Errors that can occur while validating a proposed entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Transaction has no line items.
    #[error("Transaction must have at least one item")]
    NoItems,

    /// Line amount is zero or negative.
    #[error("Item {index}: amount must be greater than zero (got {amount})")]
    InvalidAmount {
        /// Zero-based position of the offending item.
        index: usize,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Line amount has a fraction of a cent and would be rounded on storage.
    #[error("Item {index}: amount must not have more than 2 decimal places (got {amount})")]
    FractionalCents {
        /// Zero-based position of the offending item.
        index: usize,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Line amount exceeds what the ledger can hold.
    #[error("Item {index}: amount must not exceed 9999999999999.99 (got {amount})")]
    AmountTooLarge {
        /// Zero-based position of the offending item.
        index: usize,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Line references a missing or inactive account.
    #[error("Item {index}: account {account_id} does not exist or is inactive")]
    InvalidAccount {
        /// Zero-based position of the offending item.
        index: usize,
        /// The referenced account.
        account_id: AccountId,
    },

    /// Debits and credits differ by more than the tolerance.
    #[error("Debits must equal credits. Currently: Debits {debits}, Credits {credits}")]
    Imbalanced {
        /// Total debits.
        debits: Decimal,
        /// Total credits.
        credits: Decimal,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoItems => "NO_ITEMS",
            Self::InvalidAmount { .. }
            | Self::FractionalCents { .. }
            | Self::AmountTooLarge { .. } => "INVALID_AMOUNT",
            Self::InvalidAccount { .. } => "INVALID_ACCOUNT",
            Self::Imbalanced { .. } => "IMBALANCED_ENTRY",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        422
    }

    /// True for the debit/credit mismatch, as opposed to field errors.
    #[must_use]
    pub const fn is_imbalance(&self) -> bool {
        matches!(self, Self::Imbalanced { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NoItems.error_code(), "NO_ITEMS");
        assert_eq!(
            LedgerError::Imbalanced {
                debits: dec!(250.00),
                credits: dec!(249.00)
            }
            .error_code(),
            "IMBALANCED_ENTRY"
        );
    }

    #[test]
    fn test_all_are_unprocessable() {
        assert_eq!(LedgerError::NoItems.http_status_code(), 422);
        assert_eq!(
            LedgerError::InvalidAccount {
                index: 0,
                account_id: AccountId::new()
            }
            .http_status_code(),
            422
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Imbalanced {
            debits: dec!(250.00),
            credits: dec!(249.00),
        };
        assert_eq!(
            err.to_string(),
            "Debits must equal credits. Currently: Debits 250.00, Credits 249.00"
        );
        assert!(err.is_imbalance());
        assert!(
            !LedgerError::InvalidAmount {
                index: 1,
                amount: dec!(0)
            }
            .is_imbalance()
        );
    }
}
