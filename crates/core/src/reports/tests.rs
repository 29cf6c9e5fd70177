//! Tests for the reports module.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{AccountId, TransactionItemId};

use super::service::ReportService;
use super::types::{ItemAmount, LedgerLine};
use crate::accounts::{AccountRecord, AccountType};
use crate::ledger::{AccountStatus, EntryType, LedgerService, LineItemInput};

fn account(code: &str, account_type: &str) -> AccountRecord {
    AccountRecord {
        id: AccountId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type: account_type.to_string(),
        parent_id: None,
        is_active: true,
    }
}

fn item(account: &AccountRecord, entry_type: EntryType, amount: Decimal) -> ItemAmount {
    ItemAmount {
        account_id: account.id,
        entry_type,
        amount,
    }
}

fn line(entry_type: EntryType, amount: Decimal, created_at: DateTime<Utc>) -> LedgerLine {
    LedgerLine {
        item_id: TransactionItemId::new(),
        transaction_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        reference: "JE-1".to_string(),
        description: None,
        entry_type,
        amount,
        created_at,
    }
}

#[test]
fn test_trial_balance_skips_idle_and_unreportable_accounts() {
    let cash = account("1000", "Asset");
    let sales = account("4000", "income");
    let idle = account("5000", "expense");
    let legacy = account("9000", "memo");

    let items = vec![
        item(&cash, EntryType::Debit, dec!(250.00)),
        item(&sales, EntryType::Credit, dec!(250.00)),
        item(&legacy, EntryType::Debit, dec!(5.00)),
    ];
    let activity = ReportService::collect_activity(
        vec![sales.clone(), idle, legacy, cash.clone()],
        items,
    );
    let report = ReportService::trial_balance(activity);

    let codes: Vec<_> = report.accounts.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "4000"]);
    assert_eq!(report.accounts[1].account_type, AccountType::Revenue);
    assert_eq!(report.accounts[1].balance, dec!(-250.00));
    assert_eq!(report.totals.debits, dec!(250.00));
    assert_eq!(report.totals.credits, dec!(250.00));
    assert_eq!(report.totals.difference, Decimal::ZERO);
    assert!(report.totals.is_balanced);
}

#[test]
fn test_trial_balance_flags_difference() {
    let cash = account("1000", "asset");
    let sales = account("4000", "revenue");
    let activity = ReportService::collect_activity(
        vec![cash.clone(), sales.clone()],
        vec![
            item(&cash, EntryType::Debit, dec!(250.00)),
            item(&sales, EntryType::Credit, dec!(249.00)),
        ],
    );
    let report = ReportService::trial_balance(activity);
    assert_eq!(report.totals.difference, dec!(1.00));
    assert!(!report.totals.is_balanced);
}

#[test]
fn test_activity_saturates_instead_of_overflowing() {
    let cash = account("1000", "asset");
    let sales = account("4000", "revenue");
    let activity = ReportService::collect_activity(
        vec![cash.clone(), sales.clone()],
        vec![
            item(&cash, EntryType::Debit, Decimal::MAX),
            item(&cash, EntryType::Debit, Decimal::MAX),
            item(&sales, EntryType::Credit, Decimal::MAX),
        ],
    );
    assert_eq!(activity[0].total_debit, Decimal::MAX);

    let report = ReportService::trial_balance(activity);
    assert_eq!(report.totals.debits, Decimal::MAX);
    assert!(report.totals.is_balanced);
}

#[test]
fn test_general_ledger_running_balance() {
    let cash = account("1000", "asset");
    let t0 = Utc::now();
    // Out of order on purpose; the ledger sorts by insertion time.
    let lines = vec![
        line(EntryType::Credit, dec!(40), t0 + Duration::seconds(1)),
        line(EntryType::Debit, dec!(10), t0 + Duration::seconds(2)),
        line(EntryType::Debit, dec!(100), t0),
    ];

    let report = ReportService::general_ledger(&cash, lines);

    let balances: Vec<_> = report.entries.iter().map(|r| r.balance).collect();
    assert_eq!(balances, vec![dec!(100), dec!(60), dec!(70)]);
    assert_eq!(report.final_balance, dec!(70));
    assert_eq!(report.entries[0].debit, Some(dec!(100)));
    assert_eq!(report.entries[0].credit, None);
    assert_eq!(report.entries[1].debit, None);
    assert_eq!(report.entries[1].credit, Some(dec!(40)));
    assert_eq!(report.account.code, "1000");
    assert_eq!(report.account.account_type, Some(AccountType::Asset));
}

#[test]
fn test_general_ledger_empty_account() {
    let cash = account("1000", "asset");
    let report = ReportService::general_ledger(&cash, Vec::new());
    assert!(report.entries.is_empty());
    assert_eq!(report.final_balance, Decimal::ZERO);
}

#[test]
fn test_find_account() {
    let cash = account("1000", "asset");
    let accounts = vec![cash.clone()];
    assert!(ReportService::find_account(cash.id, &accounts).is_ok());
    assert!(ReportService::find_account(AccountId::new(), &accounts).is_err());
}

#[test]
fn test_gl_summary_buckets() {
    let cash = account("1000", "asset");
    let ar = account("1100", "asset");
    let loan = account("2000", "liability");
    let sales = account("4000", "income");
    let rent = account("6000", "expense");
    let settled = account("1200", "asset");

    let items = vec![
        item(&cash, EntryType::Debit, dec!(500)),
        item(&loan, EntryType::Credit, dec!(500)),
        item(&ar, EntryType::Debit, dec!(300)),
        item(&sales, EntryType::Credit, dec!(300)),
        item(&rent, EntryType::Debit, dec!(120)),
        item(&cash, EntryType::Credit, dec!(120)),
        item(&settled, EntryType::Debit, dec!(50)),
        item(&settled, EntryType::Credit, dec!(50)),
    ];
    let activity = ReportService::collect_activity(
        vec![cash, ar, loan, sales, rent, settled],
        items,
    );
    let report = ReportService::gl_summary(activity);

    let codes: Vec<_> = report.accounts.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["1000", "1100", "2000", "4000", "6000"]);
    assert_eq!(report.totals.assets, dec!(680));
    assert_eq!(report.totals.liabilities, dec!(-500));
    assert_eq!(report.totals.revenue, dec!(-300));
    assert_eq!(report.totals.expense, dec!(120));
    assert_eq!(report.totals.equity, Decimal::ZERO);
}

#[test]
fn test_gl_summary_serializes_bucket_keys() {
    let report = ReportService::gl_summary(Vec::new());
    let json = serde_json::to_value(&report).unwrap();
    for key in ["assets", "liabilities", "equity", "revenue", "expense"] {
        assert!(json["totals"].get(key).is_some(), "missing {key}");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

/// Strategy for a cent amount between 0.01 and 10,000.00.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a balanced entry over a four-account chart: a list of
/// `(debit account, credit account, amount)` splits.
fn entry_strategy() -> impl Strategy<Value = Vec<(usize, usize, Decimal)>> {
    prop::collection::vec((0usize..4, 0usize..4, amount_strategy()), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any combination of entries the validator accepts yields a balanced
    /// trial balance.
    #[test]
    fn prop_trial_balance_holds_for_validated_entries(
        entries in prop::collection::vec(entry_strategy(), 1..10),
    ) {
        let chart = vec![
            account("1000", "asset"),
            account("2000", "liability"),
            account("4000", "revenue"),
            account("6000", "expense"),
        ];
        let lookup = |id: AccountId| {
            chart
                .iter()
                .find(|a| a.id == id)
                .map(|a| AccountStatus { is_active: a.is_active })
        };

        let mut posted = Vec::new();
        for splits in entries {
            let items: Vec<LineItemInput> = splits
                .iter()
                .flat_map(|&(dr, cr, amount)| {
                    [
                        LineItemInput::debit(chart[dr].id, amount),
                        LineItemInput::credit(chart[cr].id, amount),
                    ]
                })
                .collect();
            prop_assert!(LedgerService::validate_entry(&items, lookup).is_ok());
            posted.extend(items.iter().map(|i| ItemAmount {
                account_id: i.account_id,
                entry_type: i.entry_type,
                amount: i.amount,
            }));
        }

        let report = ReportService::trial_balance(
            ReportService::collect_activity(chart.clone(), posted),
        );
        prop_assert!(report.totals.is_balanced);
        prop_assert_eq!(report.totals.debits, report.totals.credits);
    }

    /// The final balance of a general ledger is debits minus credits.
    #[test]
    fn prop_general_ledger_final_balance(
        moves in prop::collection::vec((any::<bool>(), amount_strategy()), 0..30),
    ) {
        let cash = account("1000", "asset");
        let t0 = Utc::now();
        let mut expected = Decimal::ZERO;
        let lines: Vec<_> = moves
            .iter()
            .enumerate()
            .map(|(i, &(is_debit, amount))| {
                let entry_type = if is_debit { EntryType::Debit } else { EntryType::Credit };
                expected += entry_type.signed(amount);
                line(entry_type, amount, t0 + Duration::seconds(i64::try_from(i).unwrap()))
            })
            .collect();

        let report = ReportService::general_ledger(&cash, lines);
        prop_assert_eq!(report.final_balance, expected);
        prop_assert_eq!(report.entries.len(), moves.len());
        if let Some(last) = report.entries.last() {
            prop_assert_eq!(last.balance, expected);
        }
    }
}
