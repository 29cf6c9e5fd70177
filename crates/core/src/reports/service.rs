//! Report generation service.
//!
//! Reports are recomputed in full from line items on every call.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, BALANCE_TOLERANCE, round_money};

use super::error::ReportError;
use super::types::{
    AccountActivity, GeneralLedgerReport, GeneralLedgerRow, GlSummaryReport, GlSummaryRow,
    ItemAmount, LedgerAccountHeader, LedgerLine, TrialBalanceReport, TrialBalanceRow,
    TrialBalanceTotals, TypeTotals,
};
use crate::accounts::AccountRecord;
use crate::ledger::EntryType;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Sums item amounts per account and side.
    ///
    /// Every account is returned, including those without items. Items
    /// pointing at unknown accounts are ignored. Sums saturate at the
    /// decimal range instead of overflowing.
    #[must_use]
    pub fn collect_activity(
        accounts: Vec<AccountRecord>,
        items: impl IntoIterator<Item = ItemAmount>,
    ) -> Vec<AccountActivity> {
        let mut sums: HashMap<AccountId, (Decimal, Decimal)> = HashMap::new();
        for item in items {
            let entry = sums.entry(item.account_id).or_default();
            match item.entry_type {
                EntryType::Debit => entry.0 = entry.0.saturating_add(item.amount),
                EntryType::Credit => entry.1 = entry.1.saturating_add(item.amount),
            }
        }

        accounts
            .into_iter()
            .map(|account| {
                let (total_debit, total_credit) =
                    sums.get(&account.id).copied().unwrap_or_default();
                AccountActivity {
                    account,
                    total_debit,
                    total_credit,
                }
            })
            .collect()
    }

    /// Generates a trial balance.
    ///
    /// Only reportable accounts with activity appear, ordered by code.
    /// `is_balanced` holds when the unrounded difference is under 0.01.
    #[must_use]
    pub fn trial_balance(activity: Vec<AccountActivity>) -> TrialBalanceReport {
        let mut rows = Vec::new();
        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;

        for entry in Self::reportable_by_code(activity) {
            if entry.total_debit.is_zero() && entry.total_credit.is_zero() {
                continue;
            }
            let Some(account_type) = entry.account.reporting_type() else {
                continue;
            };
            total_debits = total_debits.saturating_add(entry.total_debit);
            total_credits = total_credits.saturating_add(entry.total_credit);
            rows.push(TrialBalanceRow {
                id: entry.account.id,
                code: entry.account.code,
                name: entry.account.name,
                account_type,
                debits: round_money(entry.total_debit),
                credits: round_money(entry.total_credit),
                balance: round_money(entry.total_debit - entry.total_credit),
            });
        }

        let difference = total_debits - total_credits;
        TrialBalanceReport {
            accounts: rows,
            totals: TrialBalanceTotals {
                debits: round_money(total_debits),
                credits: round_money(total_credits),
                difference: round_money(difference),
                is_balanced: difference.abs() < BALANCE_TOLERANCE,
            },
        }
    }

    /// Generates the general ledger of one account.
    ///
    /// Lines are ordered by insertion time; ties keep their input order.
    /// The running balance starts at zero, rises on debits and falls on
    /// credits.
    #[must_use]
    pub fn general_ledger(account: &AccountRecord, mut lines: Vec<LedgerLine>) -> GeneralLedgerReport {
        lines.sort_by_key(|line| line.created_at);

        let mut running = Decimal::ZERO;
        let entries = lines
            .into_iter()
            .map(|line| {
                running = running.saturating_add(line.entry_type.signed(line.amount));
                let amount = round_money(line.amount);
                let (debit, credit) = match line.entry_type {
                    EntryType::Debit => (Some(amount), None),
                    EntryType::Credit => (None, Some(amount)),
                };
                GeneralLedgerRow {
                    id: line.item_id,
                    date: line.transaction_date,
                    reference: line.reference,
                    description: line.description,
                    debit,
                    credit,
                    balance: round_money(running),
                }
            })
            .collect();

        GeneralLedgerReport {
            account: LedgerAccountHeader {
                id: account.id,
                code: account.code.clone(),
                name: account.name.clone(),
                account_type: account.reporting_type(),
            },
            entries,
            final_balance: round_money(running),
        }
    }

    /// Looks up the account for a general ledger request.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if `id` is not in `accounts`.
    pub fn find_account(
        id: AccountId,
        accounts: &[AccountRecord],
    ) -> Result<&AccountRecord, ReportError> {
        accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or(ReportError::AccountNotFound(id))
    }

    /// Generates the GL summary: net balance per account and per type.
    ///
    /// Only reportable accounts with a nonzero balance appear, ordered by code.
    #[must_use]
    pub fn gl_summary(activity: Vec<AccountActivity>) -> GlSummaryReport {
        let mut rows = Vec::new();
        let mut totals = TypeTotals::default();

        for entry in Self::reportable_by_code(activity) {
            let balance = entry.total_debit - entry.total_credit;
            if balance.is_zero() {
                continue;
            }
            let Some(account_type) = entry.account.reporting_type() else {
                continue;
            };
            totals.add(account_type, balance);
            rows.push(GlSummaryRow {
                id: entry.account.id,
                code: entry.account.code,
                name: entry.account.name,
                account_type,
                balance: round_money(balance),
            });
        }

        GlSummaryReport {
            accounts: rows,
            totals: totals.rounded(),
        }
    }

    fn reportable_by_code(mut activity: Vec<AccountActivity>) -> Vec<AccountActivity> {
        activity.retain(|a| a.account.reporting_type().is_some());
        activity.sort_by(|a, b| a.account.code.cmp(&b.account.code));
        activity
    }
}
