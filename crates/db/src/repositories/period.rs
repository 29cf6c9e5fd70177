//! Accounting period repository.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::dimensions::{DimensionError, DimensionService, PeriodRecord, PeriodStatus};
use tally_shared::types::PeriodId;
use tracing::debug;

use crate::entities::periods;

/// Error types for period operations.
#[derive(Debug, thiserror::Error)]
pub enum PeriodRepoError {
    /// Period not found.
    #[error("Period not found: {0}")]
    NotFound(PeriodId),

    /// Name already used by another period.
    #[error("The name '{0}' has already been taken")]
    DuplicateName(String),

    /// Period rule violated.
    #[error(transparent)]
    Rule(#[from] DimensionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Period body for create and update.
#[derive(Debug, Clone)]
pub struct PeriodInput {
    /// Unique name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, not before the first.
    pub end_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
}

/// Period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All periods, latest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(&self) -> Result<Vec<periods::Model>, PeriodRepoError> {
        Ok(periods::Entity::find()
            .order_by_desc(periods::Column::StartDate)
            .all(&self.db)
            .await?)
    }

    /// Finds a period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the period does not exist.
    pub async fn find_period(&self, id: PeriodId) -> Result<periods::Model, PeriodRepoError> {
        periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PeriodRepoError::NotFound(id))
    }

    /// Creates an open period.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` or `Rule(InvalidDateRange)`.
    pub async fn create_period(&self, input: PeriodInput) -> Result<periods::Model, PeriodRepoError> {
        DimensionService::validate_range(input.start_date, input.end_date)?;
        let txn = self.db.begin().await?;
        if name_taken(&txn, &input.name, None).await? {
            return Err(PeriodRepoError::DuplicateName(input.name));
        }

        let now = Utc::now().into();
        let period = periods::ActiveModel {
            id: Set(PeriodId::new().into_inner()),
            name: Set(input.name),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            status: Set(PeriodStatus::Open.into()),
            notes: Set(input.notes),
            closed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(period)
    }

    /// Replaces a period's name, dates and notes. The status is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateName` or `Rule(InvalidDateRange)`.
    pub async fn update_period(
        &self,
        id: PeriodId,
        input: PeriodInput,
    ) -> Result<periods::Model, PeriodRepoError> {
        DimensionService::validate_range(input.start_date, input.end_date)?;
        let txn = self.db.begin().await?;
        let period = lock(&txn, id).await?;
        if name_taken(&txn, &input.name, Some(id)).await? {
            return Err(PeriodRepoError::DuplicateName(input.name));
        }

        let mut active: periods::ActiveModel = period.into();
        active.name = Set(input.name);
        active.start_date = Set(input.start_date);
        active.end_date = Set(input.end_date);
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Closes an open period. Transactions dated inside it can no longer be
    /// created or edited.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Rule(PeriodNotOpen)` if already closed or locked.
    pub async fn close_period(&self, id: PeriodId) -> Result<periods::Model, PeriodRepoError> {
        let txn = self.db.begin().await?;
        let period = lock(&txn, id).await?;
        let status = DimensionService::close_period(period.status.into())?;

        let now = Utc::now().into();
        let mut active: periods::ActiveModel = period.into();
        active.status = Set(status.into());
        active.closed_at = Set(Some(now));
        active.updated_at = Set(now);

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        debug!(period_id = %id, "period closed");
        Ok(updated)
    }

    /// Deletes an open period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Rule(PeriodNotOpen)`.
    pub async fn delete_period(&self, id: PeriodId) -> Result<(), PeriodRepoError> {
        let txn = self.db.begin().await?;
        let period = lock(&txn, id).await?;
        DimensionService::ensure_period_deletable(period.status.into())?;

        periods::Entity::delete_by_id(period.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

/// Refuses a booking date covered by a closed or locked period.
///
/// Generic over the caller's error so every repository can use it with `?`.
pub(crate) async fn ensure_bookable<E, C>(conn: &C, date: NaiveDate) -> Result<(), E>
where
    E: From<DbErr> + From<DimensionError>,
    C: ConnectionTrait,
{
    let periods = periods_covering(conn, date).await?;
    DimensionService::ensure_bookable(date, &periods)?;
    Ok(())
}

async fn periods_covering<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
) -> Result<Vec<PeriodRecord>, DbErr> {
    let rows = periods::Entity::find()
        .filter(periods::Column::StartDate.lte(date))
        .filter(periods::Column::EndDate.gte(date))
        .order_by_asc(periods::Column::StartDate)
        .all(conn)
        .await?;
    Ok(rows.iter().map(PeriodRecord::from).collect())
}

async fn lock<C: ConnectionTrait>(conn: &C, id: PeriodId) -> Result<periods::Model, PeriodRepoError> {
    periods::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(PeriodRepoError::NotFound(id))
}

async fn name_taken<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<PeriodId>,
) -> Result<bool, DbErr> {
    let mut query = periods::Entity::find().filter(periods::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(periods::Column::Id.ne(id.into_inner()));
    }
    Ok(query.count(conn).await? > 0)
}
