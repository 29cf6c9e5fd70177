//! Parent/child structure of the chart of accounts.
//!
//! Accounts form a forest. The structure is an id-indexed adjacency map
//! (parent id on each record, children looked up by index), so no account
//! ever holds a reference to another.

use std::collections::HashMap;

use serde::Serialize;
use tally_shared::types::AccountId;

use super::error::AccountError;
use super::types::{AccountRecord, AccountType};

/// Nested view of an account and its descendants.
#[derive(Debug, Clone, Serialize)]
pub struct AccountNode {
    /// The account itself.
    #[serde(flatten)]
    pub account: AccountRecord,
    /// Child accounts, ordered by code.
    pub children: Vec<AccountNode>,
}

/// Index over a flat list of accounts.
#[derive(Debug, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<AccountRecord>,
    by_id: HashMap<AccountId, usize>,
    children: HashMap<AccountId, Vec<usize>>,
    roots: Vec<usize>,
}

impl ChartOfAccounts {
    /// Builds the index. Accounts whose parent is missing are treated as roots.
    #[must_use]
    pub fn new(mut accounts: Vec<AccountRecord>) -> Self {
        accounts.sort_by(|a, b| {
            type_rank(a)
                .cmp(&type_rank(b))
                .then_with(|| a.code.cmp(&b.code))
        });

        let by_id: HashMap<AccountId, usize> = accounts
            .iter()
            .enumerate()
            .map(|(idx, account)| (account.id, idx))
            .collect();

        let mut children: HashMap<AccountId, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (idx, account) in accounts.iter().enumerate() {
            match account.parent_id {
                Some(parent) if by_id.contains_key(&parent) => {
                    children.entry(parent).or_default().push(idx);
                }
                _ => roots.push(idx),
            }
        }

        Self {
            accounts,
            by_id,
            children,
            roots,
        }
    }

    /// Looks up an account.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&AccountRecord> {
        self.by_id.get(&id).map(|&idx| &self.accounts[idx])
    }

    /// Top-level accounts.
    pub fn roots(&self) -> impl Iterator<Item = &AccountRecord> {
        self.roots.iter().map(|&idx| &self.accounts[idx])
    }

    /// Direct children of an account.
    pub fn children(&self, id: AccountId) -> impl Iterator<Item = &AccountRecord> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.accounts[idx])
    }

    /// True when the account has at least one child.
    #[must_use]
    pub fn has_children(&self, id: AccountId) -> bool {
        self.children.get(&id).is_some_and(|c| !c.is_empty())
    }

    /// Nested tree of active accounts, starting at active roots.
    ///
    /// Inactive accounts are pruned together with their subtrees.
    #[must_use]
    pub fn hierarchy(&self) -> Vec<AccountNode> {
        self.roots
            .iter()
            .filter(|&&idx| self.accounts[idx].is_active)
            .map(|&idx| self.build_node(idx))
            .collect()
    }

    fn build_node(&self, idx: usize) -> AccountNode {
        let account = &self.accounts[idx];
        let children = self
            .children
            .get(&account.id)
            .into_iter()
            .flatten()
            .filter(|&&child| self.accounts[child].is_active)
            .map(|&child| self.build_node(child))
            .collect();

        AccountNode {
            account: account.clone(),
            children,
        }
    }

    /// True when making `new_parent` the parent of `id` would close a loop,
    /// i.e. `new_parent` is `id` itself or one of its descendants.
    #[must_use]
    pub fn would_create_cycle(&self, id: AccountId, new_parent: AccountId) -> bool {
        let mut cursor = Some(new_parent);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == id {
                return true;
            }
            steps += 1;
            if steps > self.accounts.len() {
                return false;
            }
            cursor = self.get(current).and_then(|a| a.parent_id);
        }
        false
    }

    /// Checks that `parent` may become the parent of `id`.
    ///
    /// # Errors
    ///
    /// Returns `ParentNotFound` for an unknown parent and `ParentCycle` when
    /// `parent` is `id` itself or one of its descendants.
    pub fn validate_parent(&self, id: AccountId, parent: AccountId) -> Result<(), AccountError> {
        if !self.by_id.contains_key(&parent) {
            return Err(AccountError::ParentNotFound(parent));
        }
        if self.would_create_cycle(id, parent) {
            return Err(AccountError::ParentCycle(id));
        }
        Ok(())
    }
}

fn type_rank(account: &AccountRecord) -> usize {
    account
        .reporting_type()
        .and_then(|t| AccountType::ALL.iter().position(|x| *x == t))
        .unwrap_or(AccountType::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(code: &str, account_type: &str, parent: Option<AccountId>) -> AccountRecord {
        AccountRecord {
            id: AccountId::new(),
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type: account_type.to_string(),
            parent_id: parent,
            is_active: true,
        }
    }

    #[test]
    fn test_roots_and_children() {
        let assets = account("1000", "asset", None);
        let cash = account("1010", "asset", Some(assets.id));
        let bank = account("1020", "asset", Some(assets.id));
        let revenue = account("4000", "income", None);

        let chart = ChartOfAccounts::new(vec![revenue.clone(), bank.clone(), cash.clone(), assets.clone()]);

        let roots: Vec<_> = chart.roots().map(|a| a.code.as_str()).collect();
        assert_eq!(roots, vec!["1000", "4000"]);

        let kids: Vec<_> = chart.children(assets.id).map(|a| a.code.as_str()).collect();
        assert_eq!(kids, vec!["1010", "1020"]);
        assert!(chart.has_children(assets.id));
        assert!(!chart.has_children(cash.id));
    }

    #[test]
    fn test_hierarchy_prunes_inactive() {
        let assets = account("1000", "asset", None);
        let mut cash = account("1010", "asset", Some(assets.id));
        cash.is_active = false;
        let mut old_root = account("9000", "expense", None);
        old_root.is_active = false;

        let chart = ChartOfAccounts::new(vec![assets.clone(), cash, old_root]);
        let tree = chart.hierarchy();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].account.id, assets.id);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_orphan_becomes_root() {
        let orphan = account("1500", "asset", Some(AccountId::new()));
        let chart = ChartOfAccounts::new(vec![orphan.clone()]);
        assert_eq!(chart.roots().count(), 1);
    }

    #[test]
    fn test_validate_parent_detects_cycle() {
        let a = account("1000", "asset", None);
        let b = account("1100", "asset", Some(a.id));
        let c = account("1110", "asset", Some(b.id));
        let chart = ChartOfAccounts::new(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(
            chart.validate_parent(a.id, c.id),
            Err(AccountError::ParentCycle(a.id))
        );
        assert_eq!(
            chart.validate_parent(a.id, a.id),
            Err(AccountError::ParentCycle(a.id))
        );
        assert!(chart.validate_parent(c.id, a.id).is_ok());

        let missing = AccountId::new();
        assert_eq!(
            chart.validate_parent(c.id, missing),
            Err(AccountError::ParentNotFound(missing))
        );
    }
}
