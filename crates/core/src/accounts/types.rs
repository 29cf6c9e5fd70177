//! Chart of accounts domain types.

use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

/// Canonical reporting type of an account.
///
/// Historical rows may carry free-form type strings; [`AccountType::normalize`]
/// maps them onto this set and everything else is non-reportable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned. `income` is accepted as an alias.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All reportable types in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Normalizes a stored type string, case-insensitively.
    ///
    /// Returns `None` for strings that do not name a reportable type.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asset" | "assets" => Some(Self::Asset),
            "liability" | "liabilities" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" | "income" => Some(Self::Revenue),
            "expense" | "expenses" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Canonical lowercase name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Plural key used for per-type report totals.
    #[must_use]
    pub const fn bucket_key(self) -> &'static str {
        match self {
            Self::Asset => "assets",
            Self::Liability => "liabilities",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Debits increase assets and expenses.
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart of accounts row as the domain sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account ID.
    pub id: AccountId,
    /// Unique account code (e.g. `AR`, `1100`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Stored type string, possibly historical.
    pub account_type: String,
    /// Parent account, if any.
    pub parent_id: Option<AccountId>,
    /// Inactive accounts cannot receive new postings.
    pub is_active: bool,
}

impl AccountRecord {
    /// Effective reporting type, if the stored string is recognized.
    #[must_use]
    pub fn reporting_type(&self) -> Option<AccountType> {
        AccountType::normalize(&self.account_type)
    }

    /// True when the account is an asset whose name contains `needle`
    /// (case-insensitive).
    #[must_use]
    pub fn is_asset_named(&self, needle: &str) -> bool {
        self.reporting_type() == Some(AccountType::Asset)
            && self
                .name
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("asset", Some(AccountType::Asset))]
    #[case("Asset", Some(AccountType::Asset))]
    #[case("LIABILITY", Some(AccountType::Liability))]
    #[case("Equity", Some(AccountType::Equity))]
    #[case("income", Some(AccountType::Revenue))]
    #[case("Revenue", Some(AccountType::Revenue))]
    #[case(" expense ", Some(AccountType::Expense))]
    #[case("contra", None)]
    #[case("", None)]
    fn test_normalize(#[case] raw: &str, #[case] expected: Option<AccountType>) {
        assert_eq!(AccountType::normalize(raw), expected);
    }

    #[test]
    fn test_round_trips_canonical_names() {
        for t in AccountType::ALL {
            assert_eq!(AccountType::normalize(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_debit_normal() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
    }

    #[test]
    fn test_is_asset_named() {
        let account = AccountRecord {
            id: AccountId::new(),
            code: "1200".into(),
            name: "Accounts Receivable".into(),
            account_type: "Asset".into(),
            parent_id: None,
            is_active: true,
        };
        assert!(account.is_asset_named("receivable"));
        assert!(!account.is_asset_named("Cash"));

        let revenue = AccountRecord {
            account_type: "income".into(),
            ..account
        };
        assert!(!revenue.is_asset_named("Receivable"));
    }
}
