//! Ledger domain types for entry validation.
//!
//! A transaction is a set of line items, each a debit or a credit of a
//! positive amount against one account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, within_tolerance};
use uuid::Uuid;

/// Entry type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntryType {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Signed effect on a debit-minus-credit balance.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => amount,
            Self::Credit => -amount,
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(format!("Unknown entry type: {other}")),
        }
    }
}

/// Optional analytic tags carried by a line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTags {
    /// Department the line is attributed to.
    pub department_id: Option<Uuid>,
    /// Project the line is attributed to.
    pub project_id: Option<Uuid>,
    /// Subsidiary ledger account (customer, vendor, employee).
    pub subsidiary_account_id: Option<Uuid>,
}

/// Input for a single line item of a proposed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Amount, must be strictly positive.
    pub amount: Decimal,
    /// Line memo.
    pub description: Option<String>,
    /// Dimension tags, persisted verbatim.
    #[serde(default)]
    pub dimensions: DimensionTags,
}

impl LineItemInput {
    /// A debit line without memo or tags.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self::plain(account_id, EntryType::Debit, amount)
    }

    /// A credit line without memo or tags.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self::plain(account_id, EntryType::Credit, amount)
    }

    fn plain(account_id: AccountId, entry_type: EntryType, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type,
            amount,
            description: None,
            dimensions: DimensionTags::default(),
        }
    }
}

/// Debit and credit totals of a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryTotals {
    /// Sum of debit amounts.
    pub total_debits: Decimal,
    /// Sum of credit amounts.
    pub total_credits: Decimal,
    /// Debits minus credits.
    pub difference: Decimal,
    /// Whether the difference is within tolerance.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Computes totals from line items.
    #[must_use]
    pub fn from_items(items: &[LineItemInput]) -> Self {
        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;
        for item in items {
            match item.entry_type {
                EntryType::Debit => total_debits = total_debits.saturating_add(item.amount),
                EntryType::Credit => total_credits = total_credits.saturating_add(item.amount),
            }
        }
        Self {
            total_debits,
            total_credits,
            difference: total_debits.saturating_sub(total_credits),
            is_balanced: within_tolerance(total_debits, total_credits),
        }
    }
}

/// What the validator needs to know about a referenced account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountStatus {
    /// Whether the account accepts postings.
    pub is_active: bool,
}
