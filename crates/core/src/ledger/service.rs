//! Ledger service for entry validation.
//!
//! Every proposed item set (a new transaction, a full item replacement on
//! update, or a posting generated from an invoice) goes through
//! [`LedgerService::validate_entry`] before anything is written.

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, MAX_AMOUNT, is_whole_cents};

use super::error::LedgerError;
use super::types::{AccountStatus, EntryTotals, LineItemInput};

/// Ledger service for entry validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validate a complete set of line items.
    ///
    /// Checks run in order:
    /// 1. At least one item
    /// 2. Each item's amount is strictly positive, in whole cents and within
    ///    the storable maximum
    /// 3. Each item's account exists and is active
    /// 4. Debits equal credits within 0.01
    ///
    /// # Arguments
    ///
    /// * `items` - The full item set; there is no partial validation
    /// * `account_lookup` - Returns the status of an account, `None` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_entry<A>(
        items: &[LineItemInput],
        account_lookup: A,
    ) -> Result<EntryTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountStatus>,
    {
        if items.is_empty() {
            return Err(LedgerError::NoItems);
        }

        for (index, item) in items.iter().enumerate() {
            if item.amount <= Decimal::ZERO {
                return Err(LedgerError::InvalidAmount {
                    index,
                    amount: item.amount,
                });
            }
            if !is_whole_cents(item.amount) {
                return Err(LedgerError::FractionalCents {
                    index,
                    amount: item.amount,
                });
            }
            if item.amount > MAX_AMOUNT {
                return Err(LedgerError::AmountTooLarge {
                    index,
                    amount: item.amount,
                });
            }

            match account_lookup(item.account_id) {
                Some(status) if status.is_active => {}
                _ => {
                    return Err(LedgerError::InvalidAccount {
                        index,
                        account_id: item.account_id,
                    });
                }
            }
        }

        let totals = EntryTotals::from_items(items);
        if !totals.is_balanced {
            return Err(LedgerError::Imbalanced {
                debits: totals.total_debits,
                credits: totals.total_credits,
            });
        }

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use rust_decimal_macros::dec;

    fn lookup(
        accounts: &HashMap<AccountId, AccountStatus>,
    ) -> impl Fn(AccountId) -> Option<AccountStatus> + '_ {
        |id| accounts.get(&id).copied()
    }

    fn two_accounts() -> (AccountId, AccountId, HashMap<AccountId, AccountStatus>) {
        let cash = AccountId::new();
        let revenue = AccountId::new();
        let accounts = HashMap::from([
            (cash, AccountStatus { is_active: true }),
            (revenue, AccountStatus { is_active: true }),
        ]);
        (cash, revenue, accounts)
    }

    #[test]
    fn test_balanced_entry() {
        let (cash, revenue, accounts) = two_accounts();
        let items = vec![
            LineItemInput::debit(cash, dec!(250.00)),
            LineItemInput::credit(revenue, dec!(250.00)),
        ];
        let totals = LedgerService::validate_entry(&items, lookup(&accounts)).unwrap();
        assert_eq!(totals.total_debits, dec!(250.00));
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_imbalanced_entry() {
        let (cash, revenue, accounts) = two_accounts();
        let items = vec![
            LineItemInput::debit(cash, dec!(250.00)),
            LineItemInput::credit(revenue, dec!(249.00)),
        ];
        assert_eq!(
            LedgerService::validate_entry(&items, lookup(&accounts)),
            Err(LedgerError::Imbalanced {
                debits: dec!(250.00),
                credits: dec!(249.00),
            })
        );
    }

    #[test]
    fn test_tolerance_boundary() {
        let (cash, revenue, accounts) = two_accounts();
        let within = vec![
            LineItemInput::debit(cash, dec!(100.01)),
            LineItemInput::credit(revenue, dec!(100.00)),
        ];
        assert!(LedgerService::validate_entry(&within, lookup(&accounts)).is_ok());

        let beyond = vec![
            LineItemInput::debit(cash, dec!(100.02)),
            LineItemInput::credit(revenue, dec!(100.00)),
        ];
        assert!(LedgerService::validate_entry(&beyond, lookup(&accounts)).is_err());
    }

    #[test]
    fn test_empty_entry() {
        let (_, _, accounts) = two_accounts();
        assert_eq!(
            LedgerService::validate_entry(&[], lookup(&accounts)),
            Err(LedgerError::NoItems)
        );
    }

    #[test]
    fn test_zero_and_negative_amounts() {
        let (cash, revenue, accounts) = two_accounts();
        let zero = vec![
            LineItemInput::debit(cash, dec!(0)),
            LineItemInput::credit(revenue, dec!(0)),
        ];
        assert_eq!(
            LedgerService::validate_entry(&zero, lookup(&accounts)),
            Err(LedgerError::InvalidAmount {
                index: 0,
                amount: dec!(0)
            })
        );

        let negative = vec![
            LineItemInput::debit(cash, dec!(10)),
            LineItemInput::credit(revenue, dec!(-10)),
        ];
        assert!(matches!(
            LedgerService::validate_entry(&negative, lookup(&accounts)),
            Err(LedgerError::InvalidAmount { index: 1, .. })
        ));
    }

    #[test]
    fn test_fractional_cents_rejected() {
        let (cash, revenue, accounts) = two_accounts();
        // Balances exactly, but would store as 1.02 against 1.00.
        let items = vec![
            LineItemInput::debit(cash, dec!(0.335)),
            LineItemInput::debit(cash, dec!(0.335)),
            LineItemInput::debit(cash, dec!(0.330)),
            LineItemInput::credit(revenue, dec!(1.00)),
        ];
        assert_eq!(
            LedgerService::validate_entry(&items, lookup(&accounts)),
            Err(LedgerError::FractionalCents {
                index: 0,
                amount: dec!(0.335)
            })
        );

        let trailing_zero = vec![
            LineItemInput::debit(cash, dec!(12.500)),
            LineItemInput::credit(revenue, dec!(12.50)),
        ];
        assert!(LedgerService::validate_entry(&trailing_zero, lookup(&accounts)).is_ok());
    }

    #[test]
    fn test_oversized_amount_rejected_without_panic() {
        let (cash, revenue, accounts) = two_accounts();
        let items = vec![
            LineItemInput::debit(cash, Decimal::MAX),
            LineItemInput::debit(cash, Decimal::MAX),
            LineItemInput::credit(revenue, dec!(1)),
        ];
        let err = LedgerService::validate_entry(&items, lookup(&accounts)).unwrap_err();
        assert!(matches!(err, LedgerError::AmountTooLarge { index: 0, .. }));
        assert_eq!(err.error_code(), "INVALID_AMOUNT");

        let at_limit = vec![
            LineItemInput::debit(cash, MAX_AMOUNT),
            LineItemInput::credit(revenue, MAX_AMOUNT),
        ];
        assert!(LedgerService::validate_entry(&at_limit, lookup(&accounts)).is_ok());
    }

    #[test]
    fn test_unknown_account() {
        let (cash, _, accounts) = two_accounts();
        let stranger = AccountId::new();
        let items = vec![
            LineItemInput::debit(cash, dec!(10)),
            LineItemInput::credit(stranger, dec!(10)),
        ];
        assert_eq!(
            LedgerService::validate_entry(&items, lookup(&accounts)),
            Err(LedgerError::InvalidAccount {
                index: 1,
                account_id: stranger
            })
        );
    }

    #[test]
    fn test_inactive_account() {
        let (cash, revenue, mut accounts) = two_accounts();
        accounts.insert(revenue, AccountStatus { is_active: false });
        let items = vec![
            LineItemInput::debit(cash, dec!(10)),
            LineItemInput::credit(revenue, dec!(10)),
        ];
        assert!(matches!(
            LedgerService::validate_entry(&items, lookup(&accounts)),
            Err(LedgerError::InvalidAccount { .. })
        ));
    }

    #[test]
    fn test_field_errors_reported_before_imbalance() {
        let (cash, _, accounts) = two_accounts();
        let items = vec![
            LineItemInput::debit(cash, dec!(100)),
            LineItemInput::credit(AccountId::new(), dec!(1)),
        ];
        assert!(matches!(
            LedgerService::validate_entry(&items, lookup(&accounts)),
            Err(LedgerError::InvalidAccount { .. })
        ));
    }
}
