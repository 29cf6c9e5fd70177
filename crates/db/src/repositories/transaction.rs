//! Transaction repository for journal entry database operations.
//!
//! Every mutation runs in one database transaction. Status gates are checked
//! against a row read with `SELECT ... FOR UPDATE`, so two concurrent
//! approvals of the same entry serialize and the second one is refused.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Serialize;
use tally_core::accounts::AccountRecord;
use tally_core::dimensions::DimensionError;
use tally_core::invoicing::PostingPlan;
use tally_core::ledger::{AccountStatus, LedgerError, LedgerService, LineItemInput};
use tally_core::workflow::{
    TransactionStatus as DomainStatus, TransactionType as DomainType, WorkflowAction,
    WorkflowError, WorkflowService,
};
use tally_shared::types::{
    AccountId, PageRequest, PageResponse, SortOrder, TransactionId, UserId, whitelisted_sort,
};
use tracing::debug;
use uuid::Uuid;

use super::account::{load_records, sea_order};
use super::dimension::validate_item_tags;
use super::period::ensure_bookable;
use crate::entities::sea_orm_active_enums::{EntryType, TransactionStatus, TransactionType};
use crate::entities::{accounts, transaction_items, transactions};

/// Columns a client may sort transactions by.
pub const TRANSACTION_SORT_COLUMNS: [&str; 6] = [
    "reference",
    "type",
    "status",
    "amount",
    "transaction_date",
    "created_at",
];

/// Default page size of the transaction list.
pub const TRANSACTION_PAGE_SIZE: u64 = 20;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionRepoError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// Reference already used by another transaction.
    #[error("The reference '{0}' has already been taken")]
    DuplicateReference(String),

    /// Item set failed validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Status gate refused the operation.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Unknown dimension tag or a closed period.
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Free-form metadata of a transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionMetadata {
    /// Short description.
    pub description: Option<String>,
    /// Notes; rejection reasons are appended here.
    pub notes: Option<String>,
    /// Check number.
    pub check_number: Option<String>,
    /// Check date.
    pub check_date: Option<NaiveDate>,
    /// Bank name.
    pub bank: Option<String>,
    /// Payee.
    pub payee: Option<String>,
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Unique reference.
    pub reference: String,
    /// Booking date.
    pub transaction_date: NaiveDate,
    /// Transaction type.
    pub transaction_type: DomainType,
    /// Initial status.
    pub status: DomainStatus,
    /// Declared amount.
    pub amount: Decimal,
    /// Metadata columns.
    pub metadata: TransactionMetadata,
    /// Complete item set.
    pub items: Vec<LineItemInput>,
}

/// Partial metadata update: `None` keeps a column, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    /// Description.
    pub description: Option<Option<String>>,
    /// Notes.
    pub notes: Option<Option<String>>,
    /// Check number.
    pub check_number: Option<Option<String>>,
    /// Check date.
    pub check_date: Option<Option<NaiveDate>>,
    /// Bank.
    pub bank: Option<Option<String>>,
    /// Payee.
    pub payee: Option<Option<String>>,
}

/// Input for updating a draft. `None` leaves a field unchanged; `items`
/// replaces the whole item set.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// New reference.
    pub reference: Option<String>,
    /// New booking date.
    pub transaction_date: Option<NaiveDate>,
    /// New type.
    pub transaction_type: Option<DomainType>,
    /// Draft or Pending.
    pub status: Option<DomainStatus>,
    /// New declared amount.
    pub amount: Option<Decimal>,
    /// Metadata columns to change.
    pub metadata: MetadataPatch,
    /// Replacement item set.
    pub items: Option<Vec<LineItemInput>>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Case-insensitive match on reference or description.
    pub search: Option<String>,
    /// Filter by type.
    pub transaction_type: Option<DomainType>,
    /// Filter by status.
    pub status: Option<DomainStatus>,
    /// Earliest booking date (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Latest booking date (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Requested sort column, checked against [`TRANSACTION_SORT_COLUMNS`].
    pub sort_by: Option<String>,
    /// Requested sort direction.
    pub sort_order: Option<String>,
}

/// The account an item posts to, as shown next to the item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemAccount {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Stored type string.
    pub account_type: String,
}

/// A line item with its account.
#[derive(Debug, Clone, Serialize)]
pub struct ItemWithAccount {
    /// The item.
    #[serde(flatten)]
    pub item: transaction_items::Model,
    /// The account, absent only if it vanished underneath us.
    pub account: Option<ItemAccount>,
}

/// A transaction with its items and their accounts.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetail {
    /// Transaction header.
    #[serde(flatten)]
    pub transaction: transactions::Model,
    /// Line items in insertion order.
    pub items: Vec<ItemWithAccount>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists transactions with search, filters, sorting and pagination.
    ///
    /// Without a recognized sort column the newest booking date comes first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<transactions::Model>, TransactionRepoError> {
        let mut query = transactions::Entity::find();

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col(transactions::Column::Reference).ilike(pattern.clone()))
                    .add(Expr::col(transactions::Column::Description).ilike(pattern)),
            );
        }
        if let Some(transaction_type) = filter.transaction_type {
            query = query
                .filter(transactions::Column::TransactionType.eq(TransactionType::from(transaction_type)));
        }
        if let Some(status) = filter.status {
            query = query.filter(transactions::Column::Status.eq(TransactionStatus::from(status)));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(transactions::Column::TransactionDate.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(transactions::Column::TransactionDate.lte(end));
        }

        let total = query.clone().count(&self.db).await?;

        let order = SortOrder::parse(filter.sort_order.as_deref(), SortOrder::Desc);
        query = match whitelisted_sort(filter.sort_by.as_deref(), &TRANSACTION_SORT_COLUMNS)
            .and_then(sort_column)
        {
            Some(column) => query.order_by(column, sea_order(order)),
            None => query
                .order_by_desc(transactions::Column::TransactionDate)
                .order_by_desc(transactions::Column::CreatedAt),
        };

        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Finds a transaction with its items and their accounts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist.
    pub async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<TransactionDetail, TransactionRepoError> {
        let transaction = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(TransactionRepoError::NotFound(id))?;
        Ok(load_detail(&self.db, transaction).await?)
    }

    /// Creates a transaction and its items atomically.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateReference`, or `Ledger` if the item set does not
    /// validate. Nothing is written on error.
    pub async fn create_transaction(
        &self,
        user_id: UserId,
        input: CreateTransactionInput,
    ) -> Result<TransactionDetail, TransactionRepoError> {
        let txn = self.db.begin().await?;

        let accounts = load_records(&txn).await?;
        LedgerService::validate_entry(&input.items, lookup(&accounts))?;
        validate_item_tags::<TransactionRepoError, _>(&txn, &input.items).await?;
        ensure_bookable::<TransactionRepoError, _>(&txn, input.transaction_date).await?;

        if reference_taken(&txn, &input.reference, None).await? {
            return Err(TransactionRepoError::DuplicateReference(input.reference));
        }

        let now = Utc::now().into();
        let metadata = input.metadata;
        // Entries created as approved are stamped with their creator.
        let approved = input.status == DomainStatus::Approved;
        let transaction = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            reference: Set(input.reference),
            transaction_date: Set(input.transaction_date),
            transaction_type: Set(input.transaction_type.into()),
            status: Set(input.status.into()),
            amount: Set(input.amount),
            description: Set(metadata.description),
            notes: Set(metadata.notes),
            check_number: Set(metadata.check_number),
            check_date: Set(metadata.check_date),
            bank: Set(metadata.bank),
            payee: Set(metadata.payee),
            attachment_path: Set(None),
            user_id: Set(user_id.into_inner()),
            approved_by: Set(approved.then_some(user_id.into_inner())),
            approved_at: Set(approved.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        insert_items(&txn, transaction.id, &input.items).await?;
        let detail = load_detail(&txn, transaction).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Updates a draft; a supplied item set replaces the old one entirely.
    ///
    /// # Errors
    ///
    /// Returns `Workflow` unless the transaction is a draft (or the requested
    /// status is not Draft/Pending), `DuplicateReference`, or `Ledger` for an
    /// invalid replacement set.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        input: UpdateTransactionInput,
    ) -> Result<TransactionDetail, TransactionRepoError> {
        let txn = self.db.begin().await?;
        let transaction = lock(&txn, id).await?;

        let status = WorkflowService::resolve_edit_status(transaction.status.into(), input.status)?;
        // Both the old and the new booking date must sit in open periods.
        ensure_bookable::<TransactionRepoError, _>(&txn, transaction.transaction_date).await?;
        if let Some(date) = input.transaction_date {
            ensure_bookable::<TransactionRepoError, _>(&txn, date).await?;
        }

        if let Some(reference) = &input.reference
            && *reference != transaction.reference
            && reference_taken(&txn, reference, Some(id)).await?
        {
            return Err(TransactionRepoError::DuplicateReference(reference.clone()));
        }

        if let Some(items) = &input.items {
            let accounts = load_records(&txn).await?;
            LedgerService::validate_entry(items, lookup(&accounts))?;
            validate_item_tags::<TransactionRepoError, _>(&txn, items).await?;
            transaction_items::Entity::delete_many()
                .filter(transaction_items::Column::TransactionId.eq(transaction.id))
                .exec(&txn)
                .await?;
            insert_items(&txn, transaction.id, items).await?;
        }

        let mut active: transactions::ActiveModel = transaction.into();
        active.status = Set(status.into());
        if let Some(reference) = input.reference {
            active.reference = Set(reference);
        }
        if let Some(date) = input.transaction_date {
            active.transaction_date = Set(date);
        }
        if let Some(transaction_type) = input.transaction_type {
            active.transaction_type = Set(transaction_type.into());
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        let patch = input.metadata;
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(notes);
        }
        if let Some(check_number) = patch.check_number {
            active.check_number = Set(check_number);
        }
        if let Some(check_date) = patch.check_date {
            active.check_date = Set(check_date);
        }
        if let Some(bank) = patch.bank {
            active.bank = Set(bank);
        }
        if let Some(payee) = patch.payee {
            active.payee = Set(payee);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        let detail = load_detail(&txn, updated).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Approves a pending transaction.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(ImmutableState)` unless the transaction is pending.
    pub async fn approve_transaction(
        &self,
        id: TransactionId,
        approved_by: UserId,
    ) -> Result<TransactionDetail, TransactionRepoError> {
        let txn = self.db.begin().await?;
        let transaction = lock(&txn, id).await?;

        let action = WorkflowService::approve(transaction.status.into(), approved_by)?;
        let updated = apply_action(&txn, transaction, action).await?;

        let detail = load_detail(&txn, updated).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Rejects a pending transaction, appending the reason to its notes.
    ///
    /// # Errors
    ///
    /// Returns `Workflow` unless the transaction is pending and the reason
    /// is non-empty.
    pub async fn reject_transaction(
        &self,
        id: TransactionId,
        reason: &str,
    ) -> Result<TransactionDetail, TransactionRepoError> {
        let txn = self.db.begin().await?;
        let transaction = lock(&txn, id).await?;

        let action =
            WorkflowService::reject(transaction.status.into(), transaction.notes.as_deref(), reason)?;
        let updated = apply_action(&txn, transaction, action).await?;

        let detail = load_detail(&txn, updated).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Deletes a draft or rejected transaction together with its items.
    ///
    /// Returns the attachment path the transaction carried, so the caller can
    /// remove the blob.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(ImmutableState)` for pending or approved transactions.
    pub async fn delete_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<String>, TransactionRepoError> {
        let txn = self.db.begin().await?;
        let transaction = lock(&txn, id).await?;

        WorkflowService::ensure_can_delete(transaction.status.into())?;

        let attachment = transaction.attachment_path.clone();
        transactions::Entity::delete_by_id(transaction.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(attachment)
    }

    /// Checks that an attachment may be added before the blob is written.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Workflow(ImmutableState)` unless draft.
    pub async fn ensure_attachable(&self, id: TransactionId) -> Result<(), TransactionRepoError> {
        let transaction = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(TransactionRepoError::NotFound(id))?;
        WorkflowService::ensure_can_attach(transaction.status.into())?;
        Ok(())
    }

    /// Records a stored blob's path on a draft.
    ///
    /// Returns the updated transaction and the path it replaced, if any.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(ImmutableState)` if the transaction left draft in
    /// the meantime.
    pub async fn set_attachment(
        &self,
        id: TransactionId,
        path: String,
    ) -> Result<(TransactionDetail, Option<String>), TransactionRepoError> {
        let txn = self.db.begin().await?;
        let transaction = lock(&txn, id).await?;

        WorkflowService::ensure_can_attach(transaction.status.into())?;

        let previous = transaction.attachment_path.clone();
        let mut active: transactions::ActiveModel = transaction.into();
        active.attachment_path = Set(Some(path));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let detail = load_detail(&txn, updated).await?;
        txn.commit().await?;
        Ok((detail, previous))
    }
}

/// Writes a planned posting: header plus items, inside the caller's
/// database transaction.
pub(crate) async fn insert_posting(
    txn: &DatabaseTransaction,
    user_id: UserId,
    plan: &PostingPlan,
) -> Result<transactions::Model, DbErr> {
    let now = Utc::now().into();
    let approved = plan.status == DomainStatus::Approved;

    let transaction = transactions::ActiveModel {
        id: Set(TransactionId::new().into_inner()),
        reference: Set(plan.reference.clone()),
        transaction_date: Set(plan.transaction_date),
        transaction_type: Set(plan.transaction_type.into()),
        status: Set(plan.status.into()),
        amount: Set(plan.amount),
        description: Set(Some(plan.description.clone())),
        notes: Set(Some(plan.notes.clone())),
        check_number: Set(None),
        check_date: Set(None),
        bank: Set(None),
        payee: Set(None),
        attachment_path: Set(None),
        user_id: Set(user_id.into_inner()),
        approved_by: Set(approved.then_some(user_id.into_inner())),
        approved_at: Set(approved.then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    insert_items(txn, transaction.id, &plan.items).await?;
    debug!(
        transaction_id = %transaction.id,
        reference = %transaction.reference,
        items = plan.items.len(),
        "generated posting written"
    );
    Ok(transaction)
}

/// True when another transaction already uses `reference`.
pub(crate) async fn reference_taken<C: ConnectionTrait>(
    conn: &C,
    reference: &str,
    except: Option<TransactionId>,
) -> Result<bool, DbErr> {
    let mut query =
        transactions::Entity::find().filter(transactions::Column::Reference.eq(reference));
    if let Some(id) = except {
        query = query.filter(transactions::Column::Id.ne(id.into_inner()));
    }
    Ok(query.count(conn).await? > 0)
}

async fn lock(
    txn: &DatabaseTransaction,
    id: TransactionId,
) -> Result<transactions::Model, TransactionRepoError> {
    transactions::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(TransactionRepoError::NotFound(id))
}

async fn apply_action(
    txn: &DatabaseTransaction,
    transaction: transactions::Model,
    action: WorkflowAction,
) -> Result<transactions::Model, DbErr> {
    let mut active: transactions::ActiveModel = transaction.into();
    active.status = Set(action.new_status().into());
    match action {
        WorkflowAction::Approve {
            approved_by,
            approved_at,
            ..
        } => {
            active.approved_by = Set(Some(approved_by.into_inner()));
            active.approved_at = Set(Some(approved_at.into()));
        }
        WorkflowAction::Reject { notes, .. } => {
            active.notes = Set(Some(notes));
        }
    }
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await
}

async fn insert_items(
    txn: &DatabaseTransaction,
    transaction_id: Uuid,
    items: &[LineItemInput],
) -> Result<(), DbErr> {
    let now = Utc::now().into();
    for item in items {
        transaction_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id),
            account_id: Set(item.account_id.into_inner()),
            entry_type: Set(EntryType::from(item.entry_type)),
            amount: Set(item.amount),
            description: Set(item.description.clone()),
            department_id: Set(item.dimensions.department_id),
            project_id: Set(item.dimensions.project_id),
            subsidiary_account_id: Set(item.dimensions.subsidiary_account_id),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn load_detail<C: ConnectionTrait>(
    conn: &C,
    transaction: transactions::Model,
) -> Result<TransactionDetail, DbErr> {
    let rows = transaction_items::Entity::find()
        .filter(transaction_items::Column::TransactionId.eq(transaction.id))
        .order_by_asc(transaction_items::Column::CreatedAt)
        .order_by_asc(transaction_items::Column::Id)
        .find_also_related(accounts::Entity)
        .all(conn)
        .await?;

    let items = rows
        .into_iter()
        .map(|(item, account)| ItemWithAccount {
            item,
            account: account.map(|a| ItemAccount {
                id: a.id,
                code: a.code,
                name: a.name,
                account_type: a.account_type,
            }),
        })
        .collect();

    Ok(TransactionDetail { transaction, items })
}

/// Validator callback over a loaded chart of accounts.
pub(crate) fn lookup(
    accounts: &[AccountRecord],
) -> impl Fn(AccountId) -> Option<AccountStatus> + '_ {
    let index: HashMap<AccountId, bool> = accounts.iter().map(|a| (a.id, a.is_active)).collect();
    move |id| index.get(&id).map(|&is_active| AccountStatus { is_active })
}

fn sort_column(name: &str) -> Option<transactions::Column> {
    match name {
        "reference" => Some(transactions::Column::Reference),
        "type" => Some(transactions::Column::TransactionType),
        "status" => Some(transactions::Column::Status),
        "amount" => Some(transactions::Column::Amount),
        "transaction_date" => Some(transactions::Column::TransactionDate),
        "created_at" => Some(transactions::Column::CreatedAt),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(is_active: bool) -> AccountRecord {
        AccountRecord {
            id: AccountId::new(),
            code: "1000".into(),
            name: "Cash".into(),
            account_type: "asset".into(),
            parent_id: None,
            is_active,
        }
    }

    #[test]
    fn test_every_whitelisted_column_maps() {
        for name in TRANSACTION_SORT_COLUMNS {
            assert!(sort_column(name).is_some(), "{name} has no column");
        }
        assert!(sort_column("user_id").is_none());
    }

    #[test]
    fn test_lookup_reports_activity() {
        let active = record(true);
        let inactive = record(false);
        let accounts = vec![active.clone(), inactive.clone()];
        let lookup = lookup(&accounts);

        assert_eq!(lookup(active.id), Some(AccountStatus { is_active: true }));
        assert_eq!(lookup(inactive.id), Some(AccountStatus { is_active: false }));
        assert_eq!(lookup(AccountId::new()), None);
    }

    #[test]
    fn test_lookup_feeds_validator() {
        let cash = record(true);
        let closed = record(false);
        let accounts = vec![cash.clone(), closed.clone()];

        let items = vec![
            LineItemInput::debit(cash.id, dec!(10)),
            LineItemInput::credit(closed.id, dec!(10)),
        ];
        let err = LedgerService::validate_entry(&items, lookup(&accounts)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidAccount {
                index: 1,
                account_id: closed.id
            }
        );
    }

    #[test]
    fn test_workflow_errors_pass_through() {
        let err = TransactionRepoError::from(WorkflowError::ImmutableState {
            operation: tally_core::workflow::GuardedOperation::Approve,
            status: DomainStatus::Approved,
        });
        assert_eq!(err.to_string(), "Only pending transactions can be approved");
    }
}
