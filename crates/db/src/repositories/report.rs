//! Report repository: loads ledger rows for the reporting engine.
//!
//! Sums are grouped in SQL per account and side; everything else (type
//! normalization, rounding, running balances) happens in `tally-core`.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tally_core::reports::{
    GeneralLedgerReport, GlSummaryReport, ItemAmount, LedgerLine, ReportError, ReportService,
    TrialBalanceReport,
};
use tally_shared::types::{AccountId, TransactionItemId};
use uuid::Uuid;

use super::account::load_records;
use crate::entities::sea_orm_active_enums::EntryType;
use crate::entities::{transaction_items, transactions};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// Report rule violated (unknown account).
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Trial balance over every posted line, all statuses, all time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(&self) -> Result<TrialBalanceReport, ReportRepoError> {
        let accounts = load_records(&self.db).await?;
        let sums = self.sums_by_account().await?;
        Ok(ReportService::trial_balance(ReportService::collect_activity(
            accounts, sums,
        )))
    }

    /// Net balance per account and per type bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn gl_summary(&self) -> Result<GlSummaryReport, ReportRepoError> {
        let accounts = load_records(&self.db).await?;
        let sums = self.sums_by_account().await?;
        Ok(ReportService::gl_summary(ReportService::collect_activity(
            accounts, sums,
        )))
    }

    /// Ledger of one account with a running balance.
    ///
    /// # Errors
    ///
    /// Returns `Report(AccountNotFound)` for an unknown account.
    pub async fn general_ledger(
        &self,
        account_id: AccountId,
    ) -> Result<GeneralLedgerReport, ReportRepoError> {
        let accounts = load_records(&self.db).await?;
        let account = ReportService::find_account(account_id, &accounts)?;

        let rows = transaction_items::Entity::find()
            .filter(transaction_items::Column::AccountId.eq(account_id.into_inner()))
            .order_by_asc(transaction_items::Column::CreatedAt)
            .order_by_asc(transaction_items::Column::Id)
            .find_also_related(transactions::Entity)
            .all(&self.db)
            .await?;

        let lines = rows
            .into_iter()
            .filter_map(|(item, transaction)| {
                transaction.map(|t| LedgerLine {
                    item_id: TransactionItemId::from_uuid(item.id),
                    transaction_date: t.transaction_date,
                    reference: t.reference,
                    description: item.description,
                    entry_type: item.entry_type.into(),
                    amount: item.amount,
                    created_at: item.created_at.into(),
                })
            })
            .collect();

        Ok(ReportService::general_ledger(account, lines))
    }

    async fn sums_by_account(&self) -> Result<Vec<ItemAmount>, DbErr> {
        let rows: Vec<(Uuid, EntryType, Decimal)> = transaction_items::Entity::find()
            .select_only()
            .column(transaction_items::Column::AccountId)
            .column(transaction_items::Column::EntryType)
            .column_as(Expr::col(transaction_items::Column::Amount).sum(), "total")
            .group_by(transaction_items::Column::AccountId)
            .group_by(transaction_items::Column::EntryType)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(account_id, entry_type, amount)| ItemAmount {
                account_id: AccountId::from_uuid(account_id),
                entry_type: entry_type.into(),
                amount,
            })
            .collect())
    }
}
