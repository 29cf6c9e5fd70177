//! Report data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::{AccountId, TransactionItemId, round_money};

use crate::accounts::{AccountRecord, AccountType};
use crate::ledger::EntryType;

/// Lifetime debit and credit sums of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountActivity {
    /// The account.
    pub account: AccountRecord,
    /// Sum of debit item amounts.
    pub total_debit: Decimal,
    /// Sum of credit item amounts.
    pub total_credit: Decimal,
}

/// The account, side and amount of one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemAmount {
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
}

/// One line item as seen by the general ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLine {
    /// Item ID.
    pub item_id: TransactionItemId,
    /// Date of the parent transaction.
    pub transaction_date: NaiveDate,
    /// Reference of the parent transaction.
    pub reference: String,
    /// Item description.
    pub description: Option<String>,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Insertion time, the ordering key.
    pub created_at: DateTime<Utc>,
}

/// Trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Normalized account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Total debits.
    pub debits: Decimal,
    /// Total credits.
    pub credits: Decimal,
    /// Debits minus credits.
    pub balance: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceTotals {
    /// Sum of all debits.
    pub debits: Decimal,
    /// Sum of all credits.
    pub credits: Decimal,
    /// Debits minus credits.
    pub difference: Decimal,
    /// Whether the difference is under one cent.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceReport {
    /// Accounts with activity, by code.
    pub accounts: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Account header of a general ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAccountHeader {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Normalized type, `None` for non-reportable historical types.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
}

/// General ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedgerRow {
    /// Item ID.
    pub id: TransactionItemId,
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction reference.
    pub reference: String,
    /// Item description.
    pub description: Option<String>,
    /// Debit amount, null for credits.
    pub debit: Option<Decimal>,
    /// Credit amount, null for debits.
    pub credit: Option<Decimal>,
    /// Running balance after this row.
    pub balance: Decimal,
}

/// General ledger of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralLedgerReport {
    /// The account.
    pub account: LedgerAccountHeader,
    /// Rows in insertion order.
    pub entries: Vec<GeneralLedgerRow>,
    /// Balance after the last row.
    pub final_balance: Decimal,
}

/// GL summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlSummaryRow {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Normalized account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Net balance, debits minus credits.
    pub balance: Decimal,
}

/// Net balance per account type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    /// Asset accounts.
    pub assets: Decimal,
    /// Liability accounts.
    pub liabilities: Decimal,
    /// Equity accounts.
    pub equity: Decimal,
    /// Revenue accounts.
    pub revenue: Decimal,
    /// Expense accounts.
    pub expense: Decimal,
}

impl TypeTotals {
    /// Adds a balance to the bucket of its type.
    pub fn add(&mut self, account_type: AccountType, balance: Decimal) {
        let slot = match account_type {
            AccountType::Asset => &mut self.assets,
            AccountType::Liability => &mut self.liabilities,
            AccountType::Equity => &mut self.equity,
            AccountType::Revenue => &mut self.revenue,
            AccountType::Expense => &mut self.expense,
        };
        *slot = slot.saturating_add(balance);
    }

    pub(crate) fn rounded(self) -> Self {
        Self {
            assets: round_money(self.assets),
            liabilities: round_money(self.liabilities),
            equity: round_money(self.equity),
            revenue: round_money(self.revenue),
            expense: round_money(self.expense),
        }
    }
}

/// GL summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlSummaryReport {
    /// Accounts with a nonzero balance, by code.
    pub accounts: Vec<GlSummaryRow>,
    /// Per-type totals.
    pub totals: TypeTotals,
}
