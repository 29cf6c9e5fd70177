//! Account registry rules: deletion guard and role resolution.
//!
//! Role resolution finds the accounts receivable and cash-equivalent
//! accounts that generated postings are booked against.

use tally_shared::types::AccountId;

use super::error::AccountError;
use super::types::{AccountRecord, AccountType};

/// How an invoice payment was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Paper check.
    Check,
    /// Bank or wire transfer.
    BankTransfer,
    /// Card payment.
    CreditCard,
    /// Any other method name, booked to the default cash account.
    Other(String),
}

impl PaymentMethod {
    /// Parses a client-supplied method name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" => Self::Cash,
            "check" => Self::Check,
            "bank_transfer" => Self::BankTransfer,
            "credit_card" => Self::CreditCard,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Account code preferred for this method.
    #[must_use]
    pub const fn account_code(&self) -> &'static str {
        match self {
            Self::Check => "CHK",
            Self::BankTransfer => "BANK",
            Self::CreditCard => "CC",
            Self::Cash | Self::Other(_) => "CASH",
        }
    }

    /// Name as written into notes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cash => "cash",
            Self::Check => "check",
            Self::BankTransfer => "bank_transfer",
            Self::CreditCard => "credit_card",
            Self::Other(name) => name,
        }
    }
}

/// Stateless service for chart of accounts rules.
pub struct AccountService;

impl AccountService {
    /// Code of the conventional accounts receivable account.
    pub const RECEIVABLE_CODE: &'static str = "AR";

    /// Validates a type string and returns its canonical form.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the string is not a reportable type.
    pub fn parse_type(raw: &str) -> Result<AccountType, AccountError> {
        AccountType::normalize(raw).ok_or_else(|| AccountError::UnknownType(raw.to_string()))
    }

    /// Accounts with children or ledger lines cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns `InUse` naming the first blocking reference.
    pub fn ensure_deletable(has_children: bool, has_items: bool) -> Result<(), AccountError> {
        if has_children {
            return Err(AccountError::InUse {
                reason: "child accounts",
            });
        }
        if has_items {
            return Err(AccountError::InUse {
                reason: "transaction items",
            });
        }
        Ok(())
    }

    /// Resolves the accounts receivable account.
    ///
    /// Order: the configured account (if it still exists), the account coded
    /// `AR`, then the first asset account whose name contains "Receivable".
    ///
    /// # Errors
    ///
    /// Returns `ReceivableNotConfigured` if nothing matches.
    pub fn resolve_receivable(
        configured: Option<AccountId>,
        accounts: &[AccountRecord],
    ) -> Result<AccountId, AccountError> {
        configured
            .and_then(|id| accounts.iter().find(|a| a.id == id))
            .or_else(|| accounts.iter().find(|a| a.code == Self::RECEIVABLE_CODE))
            .or_else(|| accounts.iter().find(|a| a.is_asset_named("Receivable")))
            .map(|a| a.id)
            .ok_or(AccountError::ReceivableNotConfigured)
    }

    /// Resolves the cash-equivalent account for a payment method.
    ///
    /// Order: the account whose code matches the method, then the first asset
    /// account whose name contains "Cash".
    ///
    /// # Errors
    ///
    /// Returns `CashNotConfigured` if nothing matches.
    pub fn resolve_cash(
        method: &PaymentMethod,
        accounts: &[AccountRecord],
    ) -> Result<AccountId, AccountError> {
        let code = method.account_code();
        accounts
            .iter()
            .find(|a| a.code == code)
            .or_else(|| accounts.iter().find(|a| a.is_asset_named("Cash")))
            .map(|a| a.id)
            .ok_or_else(|| AccountError::CashNotConfigured(method.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn account(code: &str, name: &str, account_type: &str) -> AccountRecord {
        AccountRecord {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            account_type: account_type.into(),
            parent_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_ensure_deletable() {
        assert!(AccountService::ensure_deletable(false, false).is_ok());
        assert_eq!(
            AccountService::ensure_deletable(true, true),
            Err(AccountError::InUse {
                reason: "child accounts"
            })
        );
        assert_eq!(
            AccountService::ensure_deletable(false, true),
            Err(AccountError::InUse {
                reason: "transaction items"
            })
        );
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(AccountService::parse_type("Income"), Ok(AccountType::Revenue));
        assert!(AccountService::parse_type("misc").is_err());
    }

    #[test]
    fn test_receivable_prefers_configured() {
        let configured = account("1300", "Trade debtors", "asset");
        let coded = account("AR", "Accounts Receivable", "asset");
        let accounts = vec![coded.clone(), configured.clone()];

        assert_eq!(
            AccountService::resolve_receivable(Some(configured.id), &accounts),
            Ok(configured.id)
        );
        assert_eq!(
            AccountService::resolve_receivable(None, &accounts),
            Ok(coded.id)
        );
    }

    #[test]
    fn test_receivable_stale_setting_falls_back() {
        let coded = account("AR", "Receivables", "asset");
        assert_eq!(
            AccountService::resolve_receivable(Some(AccountId::new()), &[coded.clone()]),
            Ok(coded.id)
        );
    }

    #[test]
    fn test_receivable_by_name_requires_asset() {
        let liability = account("2100", "Receivable Clearing", "liability");
        let asset = account("1200", "Trade Receivables", "Asset");

        assert_eq!(
            AccountService::resolve_receivable(None, &[liability.clone()]),
            Err(AccountError::ReceivableNotConfigured)
        );
        assert_eq!(
            AccountService::resolve_receivable(None, &[liability, asset.clone()]),
            Ok(asset.id)
        );
    }

    #[rstest]
    #[case("check", "CHK")]
    #[case("bank_transfer", "BANK")]
    #[case("credit_card", "CC")]
    #[case("cash", "CASH")]
    #[case("gcash", "CASH")]
    fn test_method_codes(#[case] method: &str, #[case] code: &str) {
        assert_eq!(PaymentMethod::parse(method).account_code(), code);
    }

    #[test]
    fn test_resolve_cash_by_code_then_name() {
        let bank = account("BANK", "Main Bank", "asset");
        let petty = account("1010", "Petty Cash", "asset");
        let accounts = vec![petty.clone(), bank.clone()];

        assert_eq!(
            AccountService::resolve_cash(&PaymentMethod::BankTransfer, &accounts),
            Ok(bank.id)
        );
        assert_eq!(
            AccountService::resolve_cash(&PaymentMethod::Check, &accounts),
            Ok(petty.id)
        );
        assert_eq!(
            AccountService::resolve_cash(&PaymentMethod::Cash, &[bank]),
            Err(AccountError::CashNotConfigured("cash".into()))
        );
    }
}
