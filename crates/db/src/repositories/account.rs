//! Account repository for chart of accounts database operations.

use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tally_core::accounts::{
    AccountError, AccountNode, AccountRecord, AccountService, AccountType, ChartOfAccounts,
};
use tally_shared::types::{AccountId, PageRequest, PageResponse, SortOrder, whitelisted_sort};
use uuid::Uuid;

use super::dimension::has_subsidiaries;
use crate::entities::{accounts, transaction_items};

/// Columns a client may sort accounts by.
pub const ACCOUNT_SORT_COLUMNS: [&str; 4] = ["code", "name", "account_type", "created_at"];

/// Default page size of the account list.
pub const ACCOUNT_PAGE_SIZE: u64 = 15;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Account code already exists.
    #[error("Account code '{0}' has already been taken")]
    DuplicateCode(String),

    /// Chart of accounts rule violated.
    #[error(transparent)]
    Rule(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Reporting type, stored in canonical form.
    pub account_type: AccountType,
    /// Parent account for hierarchical structure.
    pub parent_id: Option<AccountId>,
    /// Free-text description.
    pub description: Option<String>,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

/// Input for updating an account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account code.
    pub code: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Reporting type.
    pub account_type: Option<AccountType>,
    /// Parent account; `Some(None)` detaches the account.
    pub parent_id: Option<Option<AccountId>>,
    /// Description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Case-insensitive match on code or name.
    pub search: Option<String>,
    /// Filter by stored type string (case-insensitive).
    pub account_type: Option<String>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Requested sort column, checked against [`ACCOUNT_SORT_COLUMNS`].
    pub sort_by: Option<String>,
    /// Requested sort direction.
    pub sort_order: Option<String>,
}

/// An account with its parent and direct children.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    /// The account itself.
    #[serde(flatten)]
    pub account: accounts::Model,
    /// Parent account, if any.
    pub parent: Option<accounts::Model>,
    /// Direct children ordered by code.
    pub children: Vec<accounts::Model>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists accounts with search, filters, sorting and pagination.
    ///
    /// Without a recognized sort column accounts are ordered by type, then code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<accounts::Model>, AccountRepoError> {
        let mut query = accounts::Entity::find();

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col(accounts::Column::Code).ilike(pattern.clone()))
                    .add(Expr::col(accounts::Column::Name).ilike(pattern)),
            );
        }
        if let Some(account_type) = filter.account_type.as_deref() {
            query = query.filter(Expr::col(accounts::Column::AccountType).ilike(account_type));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        let total = query.clone().count(&self.db).await?;

        let order = SortOrder::parse(filter.sort_order.as_deref(), SortOrder::Asc);
        query = match whitelisted_sort(filter.sort_by.as_deref(), &ACCOUNT_SORT_COLUMNS)
            .and_then(sort_column)
        {
            Some(column) => query.order_by(column, sea_order(order)),
            None => query
                .order_by_asc(accounts::Column::AccountType)
                .order_by_asc(accounts::Column::Code),
        };

        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Nested tree of active accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn hierarchy(&self) -> Result<Vec<AccountNode>, AccountRepoError> {
        let records = load_records(&self.db).await?;
        Ok(ChartOfAccounts::new(records).hierarchy())
    }

    /// Finds an account with its parent and children.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn find_account(&self, id: AccountId) -> Result<AccountDetail, AccountRepoError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountRepoError::NotFound(id))?;

        let parent = match account.parent_id {
            Some(parent_id) => accounts::Entity::find_by_id(parent_id).one(&self.db).await?,
            None => None,
        };

        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(account.id))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        Ok(AccountDetail {
            account,
            parent,
            children,
        })
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` if the code is taken and `Rule` if the parent
    /// does not exist.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountRepoError> {
        let txn = self.db.begin().await?;

        if code_taken(&txn, &input.code, None).await? {
            return Err(AccountRepoError::DuplicateCode(input.code));
        }

        let id = AccountId::new();
        if let Some(parent_id) = input.parent_id {
            let chart = ChartOfAccounts::new(load_records(&txn).await?);
            chart.validate_parent(id, parent_id)?;
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.as_str().to_string()),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(account)
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateCode`, or `Rule` when the new parent is
    /// missing or would make the account its own ancestor.
    pub async fn update_account(
        &self,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountRepoError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(AccountRepoError::NotFound(id))?;

        if let Some(code) = &input.code
            && *code != account.code
            && code_taken(&txn, code, Some(id)).await?
        {
            return Err(AccountRepoError::DuplicateCode(code.clone()));
        }

        if let Some(Some(parent_id)) = input.parent_id {
            let chart = ChartOfAccounts::new(load_records(&txn).await?);
            chart.validate_parent(id, parent_id)?;
        }

        let mut active: accounts::ActiveModel = account.into();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type.as_str().to_string());
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id.map(AccountId::into_inner));
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an account with no children, ledger lines or subsidiary accounts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Rule(InUse)` naming what still references it.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountRepoError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(AccountRepoError::NotFound(id))?;

        let has_children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(account.id))
            .count(&txn)
            .await?
            > 0;
        let has_items = transaction_items::Entity::find()
            .filter(transaction_items::Column::AccountId.eq(account.id))
            .count(&txn)
            .await?
            > 0;
        AccountService::ensure_deletable(has_children, has_items)?;
        if has_subsidiaries(&txn, account.id).await? {
            return Err(AccountError::InUse {
                reason: "subsidiary accounts",
            }
            .into());
        }

        accounts::Entity::delete_by_id(account.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

/// Loads the whole chart of accounts as domain records.
pub(crate) async fn load_records<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<AccountRecord>, DbErr> {
    let rows = accounts::Entity::find()
        .order_by_asc(accounts::Column::Code)
        .all(conn)
        .await?;
    Ok(rows.iter().map(AccountRecord::from).collect())
}

async fn code_taken<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    except: Option<AccountId>,
) -> Result<bool, DbErr> {
    let mut query = accounts::Entity::find().filter(accounts::Column::Code.eq(code));
    if let Some(id) = except {
        query = query.filter(accounts::Column::Id.ne(id.into_inner()));
    }
    Ok(query.count(conn).await? > 0)
}

fn sort_column(name: &str) -> Option<accounts::Column> {
    match name {
        "code" => Some(accounts::Column::Code),
        "name" => Some(accounts::Column::Name),
        "account_type" => Some(accounts::Column::AccountType),
        "created_at" => Some(accounts::Column::CreatedAt),
        _ => None,
    }
}

pub(crate) const fn sea_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}
