//! Property-based tests for LedgerService.
//!
//! - Every accepted entry balances within 0.01
//! - Mirrored debit/credit sets are always accepted
//! - Any non-positive amount is rejected regardless of balance
//! - Accepted entries still balance after amounts are stored at 2 decimals

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, BALANCE_TOLERANCE, round_money};

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{AccountStatus, EntryType, LineItemInput};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate amounts with three decimal places (0.001 to 10,000.000),
/// so roughly nine in ten carry a fraction of a cent.
fn mills_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|mills| Decimal::new(mills, 3))
}

/// Strategy to generate entry type.
fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn item(entry_type: EntryType, amount: Decimal) -> LineItemInput {
    LineItemInput {
        account_id: AccountId::new(),
        entry_type,
        amount,
        description: None,
        dimensions: Default::default(),
    }
}

/// Every account exists and is active.
#[allow(clippy::unnecessary_wraps)]
fn any_account(_id: AccountId) -> Option<AccountStatus> {
    Some(AccountStatus { is_active: true })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_accepted_entries_balance(
        lines in prop::collection::vec((entry_type_strategy(), positive_amount()), 1..12)
    ) {
        let items: Vec<_> = lines.into_iter().map(|(t, a)| item(t, a)).collect();

        if let Ok(totals) = LedgerService::validate_entry(&items, any_account) {
            prop_assert!((totals.total_debits - totals.total_credits).abs() <= BALANCE_TOLERANCE);
        }
    }

    #[test]
    fn prop_mirrored_entries_accepted(
        amounts in prop::collection::vec(positive_amount(), 1..10)
    ) {
        let mut items: Vec<_> = amounts.iter().map(|a| item(EntryType::Debit, *a)).collect();
        let total: Decimal = amounts.iter().copied().sum();
        items.push(item(EntryType::Credit, total));

        let totals = LedgerService::validate_entry(&items, any_account);
        prop_assert!(totals.is_ok());
        let totals = totals.unwrap();
        prop_assert_eq!(totals.total_debits, total);
        prop_assert_eq!(totals.total_credits, total);
    }

    #[test]
    fn prop_skew_beyond_tolerance_rejected(
        amount in positive_amount(),
        skew_cents in 2i64..100_000,
    ) {
        let skew = Decimal::new(skew_cents, 2);
        let items = vec![
            item(EntryType::Debit, amount + skew),
            item(EntryType::Credit, amount),
        ];

        let result = LedgerService::validate_entry(&items, any_account);
        prop_assert!(
            matches!(result, Err(LedgerError::Imbalanced { .. })),
            "expected LedgerError::Imbalanced"
        );
    }

    #[test]
    fn prop_non_positive_amount_rejected(
        amount in -1_000_000i64..=0,
        position in 0usize..3,
    ) {
        let bad = Decimal::new(amount, 2);
        let mut items = vec![
            item(EntryType::Debit, Decimal::new(100, 0)),
            item(EntryType::Credit, Decimal::new(100, 0)),
            item(EntryType::Debit, Decimal::new(5, 0)),
        ];
        items[position].amount = bad;

        let result = LedgerService::validate_entry(&items, any_account);
        let rejected = matches!(result, Err(LedgerError::InvalidAmount { index, .. }) if index == position);
        prop_assert!(rejected);
    }

    #[test]
    fn prop_accepted_entries_survive_storage_rounding(
        lines in prop::collection::vec((entry_type_strategy(), mills_amount()), 1..8)
    ) {
        let items: Vec<_> = lines.into_iter().map(|(t, a)| item(t, a)).collect();

        if LedgerService::validate_entry(&items, any_account).is_ok() {
            let stored = |wanted: EntryType| -> Decimal {
                items
                    .iter()
                    .filter(|i| i.entry_type == wanted)
                    .map(|i| round_money(i.amount))
                    .sum()
            };
            for i in &items {
                prop_assert_eq!(round_money(i.amount), i.amount);
            }
            prop_assert!((stored(EntryType::Debit) - stored(EntryType::Credit)).abs() <= BALANCE_TOLERANCE);
        }
    }

    #[test]
    fn prop_sub_cent_amount_rejected(
        mills in 1i64..10_000_000,
        position in 0usize..2,
    ) {
        prop_assume!(mills % 10 != 0);
        let amount = Decimal::new(mills, 3);
        let mut items = vec![
            item(EntryType::Debit, amount),
            item(EntryType::Credit, amount),
        ];
        items[1 - position].amount = round_money(amount).max(Decimal::new(1, 2));

        let result = LedgerService::validate_entry(&items, any_account);
        prop_assert!(
            matches!(result, Err(LedgerError::FractionalCents { .. })),
            "expected LedgerError::FractionalCents"
        );
    }
}
