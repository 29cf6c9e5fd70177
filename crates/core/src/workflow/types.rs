//! Workflow domain types for transaction lifecycle management.
//!
//! This module defines the core types used for managing transaction
//! status transitions and workflow actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::UserId;

/// Transaction status in the approval workflow.
///
/// The valid transitions are:
/// - Draft → Pending (by updating the status field)
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// There is no reversal out of Approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Transaction is being drafted; items may be replaced.
    Draft,
    /// Transaction awaits approval.
    Pending,
    /// Transaction has been approved.
    Approved,
    /// Transaction has been rejected.
    Rejected,
}

impl TransactionStatus {
    /// All statuses.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Pending, Self::Approved, Self::Rejected];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if fields and items may be changed.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the transaction may be deleted.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money received.
    Receipt,
    /// Money paid out.
    Payment,
    /// General journal entry.
    Journal,
    /// Transfer between accounts.
    Transfer,
    /// Cash receipt, generated by invoice payments.
    CashReceipt,
    /// E-wallet payment.
    Gcash,
    /// Bank transfer.
    BankTransfer,
    /// Check received.
    Check,
    /// Check disbursement.
    CheckDisbursement,
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Payment => "payment",
            Self::Journal => "journal",
            Self::Transfer => "transfer",
            Self::CashReceipt => "cash_receipt",
            Self::Gcash => "gcash",
            Self::BankTransfer => "bank_transfer",
            Self::Check => "check",
            Self::CheckDisbursement => "check_disbursement",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
        }
    }

    /// Parses a type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "receipt" => Some(Self::Receipt),
            "payment" => Some(Self::Payment),
            "journal" => Some(Self::Journal),
            "transfer" => Some(Self::Transfer),
            "cash_receipt" => Some(Self::CashReceipt),
            "gcash" => Some(Self::Gcash),
            "bank_transfer" => Some(Self::BankTransfer),
            "check" => Some(Self::Check),
            "check_disbursement" => Some(Self::CheckDisbursement),
            "credit_card" => Some(Self::CreditCard),
            "debit_card" => Some(Self::DebitCard),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation gated by transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedOperation {
    /// Field or item update.
    Update,
    /// Hard delete.
    Delete,
    /// Approval.
    Approve,
    /// Rejection.
    Reject,
    /// Attachment upload.
    Attach,
}

impl GuardedOperation {
    /// Message shown when the operation is refused.
    #[must_use]
    pub const fn refusal(&self) -> &'static str {
        match self {
            Self::Update => "Only draft transactions can be edited",
            Self::Delete => "Only draft or rejected transactions can be deleted",
            Self::Approve => "Only pending transactions can be approved",
            Self::Reject => "Only pending transactions can be rejected",
            Self::Attach => "Attachments can only be added to draft transactions",
        }
    }
}

/// Workflow action representing a state transition with audit data.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Approve a pending transaction.
    Approve {
        /// The new status after approval.
        new_status: TransactionStatus,
        /// The user who approved the transaction.
        approved_by: UserId,
        /// When the transaction was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending transaction.
    Reject {
        /// The new status after rejection.
        new_status: TransactionStatus,
        /// Notes with the rejection reason appended.
        notes: String,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> TransactionStatus {
        match self {
            Self::Approve { new_status, .. } | Self::Reject { new_status, .. } => *new_status,
        }
    }
}
