//! Dimension repository: departments, projects and subsidiary accounts.
//!
//! Line items reference these rows through foreign keys; the transaction
//! repository resolves every tag here before it writes items.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use serde::Serialize;
use tally_core::dimensions::{
    DimensionError, DimensionKind, DimensionRef, DimensionService, DimensionStatus,
    ProjectStatus, SubsidiaryType,
};
use tally_core::ledger::LineItemInput;
use tally_shared::types::{AccountId, PageRequest, PageResponse};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{
    DimensionStatus as StatusColumn, ProjectStatus as ProjectStatusColumn,
    SubsidiaryType as SubsidiaryTypeColumn,
};
use crate::entities::{accounts, departments, projects, subsidiary_accounts, transaction_items};

/// Default page size of the dimension lists.
pub const DIMENSION_PAGE_SIZE: u64 = 20;

/// Error types for dimension operations.
#[derive(Debug, thiserror::Error)]
pub enum DimensionRepoError {
    /// Row not found.
    #[error("{} not found: {id}", capitalize(.kind.label()))]
    NotFound {
        /// Which table.
        kind: DimensionKind,
        /// Requested ID.
        id: Uuid,
    },

    /// Code already used in the same table.
    #[error("The code '{0}' has already been taken")]
    DuplicateCode(String),

    /// A referenced row does not exist.
    #[error("The selected {field} is invalid")]
    InvalidReference {
        /// Request field holding the reference.
        field: &'static str,
        /// The missing ID.
        id: Uuid,
    },

    /// Dimension rule violated.
    #[error(transparent)]
    Rule(#[from] DimensionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options shared by the dimension lists.
#[derive(Debug, Clone, Default)]
pub struct DimensionFilter {
    /// Case-insensitive match on code or name.
    pub search: Option<String>,
    /// Stored status name.
    pub status: Option<String>,
    /// Projects only: owning department.
    pub department_id: Option<Uuid>,
    /// Subsidiary accounts only: parent chart account.
    pub account_id: Option<AccountId>,
    /// Subsidiary accounts only: stored type name.
    pub subsidiary_type: Option<String>,
}

/// Department body for create and update.
#[derive(Debug, Clone)]
pub struct DepartmentInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Manager.
    pub manager_name: Option<String>,
    /// Budget, never negative.
    pub budget: Option<Decimal>,
    /// Active or inactive.
    pub status: DimensionStatus,
}

/// Project body for create and update.
#[derive(Debug, Clone)]
pub struct ProjectInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Owning department.
    pub department_id: Option<Uuid>,
    /// Project manager.
    pub project_manager: Option<String>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date, not before the start date.
    pub end_date: Option<NaiveDate>,
    /// Budget, never negative.
    pub budget: Option<Decimal>,
    /// Lifecycle status.
    pub status: ProjectStatus,
}

/// Subsidiary account body for create and update.
#[derive(Debug, Clone)]
pub struct SubsidiaryAccountInput {
    /// Chart account it hangs under.
    pub account_id: AccountId,
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// What it tracks.
    pub subsidiary_type: SubsidiaryType,
    /// Active or inactive.
    pub status: DimensionStatus,
}

/// A department with its projects.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentDetail {
    /// The department.
    #[serde(flatten)]
    pub department: departments::Model,
    /// Projects owned by it, ordered by code.
    pub projects: Vec<projects::Model>,
}

/// A project with its department.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    /// The project.
    #[serde(flatten)]
    pub project: projects::Model,
    /// Owning department, if any.
    pub department: Option<departments::Model>,
}

/// A subsidiary account with its chart account.
#[derive(Debug, Clone, Serialize)]
pub struct SubsidiaryAccountDetail {
    /// The subsidiary account.
    #[serde(flatten)]
    pub subsidiary_account: subsidiary_accounts::Model,
    /// Parent chart account.
    pub account: Option<accounts::Model>,
}

/// Dimension repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct DimensionRepository {
    db: DatabaseConnection,
}

impl DimensionRepository {
    /// Creates a new dimension repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Departments
    // ========================================================================

    /// Lists departments ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_departments(
        &self,
        filter: DimensionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<departments::Model>, DimensionRepoError> {
        let mut query = searched(
            departments::Entity::find(),
            filter.search.as_deref(),
            departments::Column::Code,
            departments::Column::Name,
        );
        if let Some(status) = filter.status.as_deref().and_then(DimensionStatus::parse) {
            query = query.filter(departments::Column::Status.eq(StatusColumn::from(status)));
        }
        let query = query.order_by_asc(departments::Column::Code);
        Ok(paginate(&self.db, query, page).await?)
    }

    /// Finds a department with its projects.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the department does not exist.
    pub async fn find_department(&self, id: Uuid) -> Result<DepartmentDetail, DimensionRepoError> {
        let department = departments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DimensionRepoError::NotFound {
                kind: DimensionKind::Department,
                id,
            })?;
        let projects = projects::Entity::find()
            .filter(projects::Column::DepartmentId.eq(id))
            .order_by_asc(projects::Column::Code)
            .all(&self.db)
            .await?;
        Ok(DepartmentDetail {
            department,
            projects,
        })
    }

    /// Creates a department.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` if the code is taken.
    pub async fn create_department(
        &self,
        input: DepartmentInput,
    ) -> Result<departments::Model, DimensionRepoError> {
        let txn = self.db.begin().await?;
        if code_taken::<departments::Entity, _>(
            &txn,
            departments::Column::Code,
            departments::Column::Id,
            &input.code,
            None,
        )
        .await?
        {
            return Err(DimensionRepoError::DuplicateCode(input.code));
        }

        let now = Utc::now().into();
        let department = departments::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            manager_name: Set(input.manager_name),
            budget: Set(input.budget),
            status: Set(input.status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(department)
    }

    /// Replaces a department's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `DuplicateCode`.
    pub async fn update_department(
        &self,
        id: Uuid,
        input: DepartmentInput,
    ) -> Result<departments::Model, DimensionRepoError> {
        let txn = self.db.begin().await?;
        let department = departments::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DimensionRepoError::NotFound {
                kind: DimensionKind::Department,
                id,
            })?;
        if code_taken::<departments::Entity, _>(
            &txn,
            departments::Column::Code,
            departments::Column::Id,
            &input.code,
            Some(id),
        )
        .await?
        {
            return Err(DimensionRepoError::DuplicateCode(input.code));
        }

        let mut active: departments::ActiveModel = department.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.manager_name = Set(input.manager_name);
        active.budget = Set(input.budget);
        active.status = Set(input.status.into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a department no ledger line is tagged with. Its projects are
    /// detached.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Rule(InUse)` while items reference it.
    pub async fn delete_department(&self, id: Uuid) -> Result<(), DimensionRepoError> {
        let txn = self.db.begin().await?;
        if departments::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DimensionRepoError::NotFound {
                kind: DimensionKind::Department,
                id,
            });
        }
        let used = tagged_items(&txn, transaction_items::Column::DepartmentId, id).await?;
        DimensionService::ensure_deletable(DimensionKind::Department, used)?;

        departments::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Lists projects ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_projects(
        &self,
        filter: DimensionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<projects::Model>, DimensionRepoError> {
        let mut query = searched(
            projects::Entity::find(),
            filter.search.as_deref(),
            projects::Column::Code,
            projects::Column::Name,
        );
        if let Some(status) = filter.status.as_deref().and_then(ProjectStatus::parse) {
            query = query.filter(projects::Column::Status.eq(ProjectStatusColumn::from(status)));
        }
        if let Some(department_id) = filter.department_id {
            query = query.filter(projects::Column::DepartmentId.eq(department_id));
        }
        let query = query.order_by_asc(projects::Column::Code);
        Ok(paginate(&self.db, query, page).await?)
    }

    /// Finds a project with its department.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the project does not exist.
    pub async fn find_project(&self, id: Uuid) -> Result<ProjectDetail, DimensionRepoError> {
        let (project, department) = projects::Entity::find_by_id(id)
            .find_also_related(departments::Entity)
            .one(&self.db)
            .await?
            .ok_or(DimensionRepoError::NotFound {
                kind: DimensionKind::Project,
                id,
            })?;
        Ok(ProjectDetail {
            project,
            department,
        })
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode`, `InvalidReference` for an unknown department,
    /// or `Rule(InvalidDateRange)`.
    pub async fn create_project(
        &self,
        input: ProjectInput,
    ) -> Result<projects::Model, DimensionRepoError> {
        DimensionService::validate_optional_range(input.start_date, input.end_date)?;
        let txn = self.db.begin().await?;
        if code_taken::<projects::Entity, _>(
            &txn,
            projects::Column::Code,
            projects::Column::Id,
            &input.code,
            None,
        )
        .await?
        {
            return Err(DimensionRepoError::DuplicateCode(input.code));
        }
        ensure_department(&txn, input.department_id).await?;

        let now = Utc::now().into();
        let project = projects::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            department_id: Set(input.department_id),
            project_manager: Set(input.project_manager),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            budget: Set(input.budget),
            status: Set(input.status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(project)
    }

    /// Replaces a project's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateCode`, `InvalidReference` or
    /// `Rule(InvalidDateRange)`.
    pub async fn update_project(
        &self,
        id: Uuid,
        input: ProjectInput,
    ) -> Result<projects::Model, DimensionRepoError> {
        DimensionService::validate_optional_range(input.start_date, input.end_date)?;
        let txn = self.db.begin().await?;
        let project = projects::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DimensionRepoError::NotFound {
                kind: DimensionKind::Project,
                id,
            })?;
        if code_taken::<projects::Entity, _>(
            &txn,
            projects::Column::Code,
            projects::Column::Id,
            &input.code,
            Some(id),
        )
        .await?
        {
            return Err(DimensionRepoError::DuplicateCode(input.code));
        }
        ensure_department(&txn, input.department_id).await?;

        let mut active: projects::ActiveModel = project.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.department_id = Set(input.department_id);
        active.project_manager = Set(input.project_manager);
        active.start_date = Set(input.start_date);
        active.end_date = Set(input.end_date);
        active.budget = Set(input.budget);
        active.status = Set(input.status.into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a project no ledger line is tagged with.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Rule(InUse)` while items reference it.
    pub async fn delete_project(&self, id: Uuid) -> Result<(), DimensionRepoError> {
        let txn = self.db.begin().await?;
        if projects::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DimensionRepoError::NotFound {
                kind: DimensionKind::Project,
                id,
            });
        }
        let used = tagged_items(&txn, transaction_items::Column::ProjectId, id).await?;
        DimensionService::ensure_deletable(DimensionKind::Project, used)?;

        projects::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Subsidiary accounts
    // ========================================================================

    /// Lists subsidiary accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_subsidiary_accounts(
        &self,
        filter: DimensionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<subsidiary_accounts::Model>, DimensionRepoError> {
        let mut query = searched(
            subsidiary_accounts::Entity::find(),
            filter.search.as_deref(),
            subsidiary_accounts::Column::Code,
            subsidiary_accounts::Column::Name,
        );
        if let Some(status) = filter.status.as_deref().and_then(DimensionStatus::parse) {
            query = query.filter(subsidiary_accounts::Column::Status.eq(StatusColumn::from(status)));
        }
        if let Some(kind) = filter.subsidiary_type.as_deref().and_then(SubsidiaryType::parse) {
            query = query
                .filter(subsidiary_accounts::Column::SubsidiaryType.eq(SubsidiaryTypeColumn::from(kind)));
        }
        if let Some(account_id) = filter.account_id {
            query =
                query.filter(subsidiary_accounts::Column::AccountId.eq(account_id.into_inner()));
        }
        let query = query.order_by_asc(subsidiary_accounts::Column::Code);
        Ok(paginate(&self.db, query, page).await?)
    }

    /// Finds a subsidiary account with its chart account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the subsidiary account does not exist.
    pub async fn find_subsidiary_account(
        &self,
        id: Uuid,
    ) -> Result<SubsidiaryAccountDetail, DimensionRepoError> {
        let (subsidiary_account, account) = subsidiary_accounts::Entity::find_by_id(id)
            .find_also_related(accounts::Entity)
            .one(&self.db)
            .await?
            .ok_or(DimensionRepoError::NotFound {
                kind: DimensionKind::SubsidiaryAccount,
                id,
            })?;
        Ok(SubsidiaryAccountDetail {
            subsidiary_account,
            account,
        })
    }

    /// Creates a subsidiary account under a chart account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode`, or `InvalidReference` for an unknown account.
    pub async fn create_subsidiary_account(
        &self,
        input: SubsidiaryAccountInput,
    ) -> Result<subsidiary_accounts::Model, DimensionRepoError> {
        let txn = self.db.begin().await?;
        if code_taken::<subsidiary_accounts::Entity, _>(
            &txn,
            subsidiary_accounts::Column::Code,
            subsidiary_accounts::Column::Id,
            &input.code,
            None,
        )
        .await?
        {
            return Err(DimensionRepoError::DuplicateCode(input.code));
        }
        ensure_account(&txn, input.account_id).await?;

        let now = Utc::now().into();
        let subsidiary = subsidiary_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(input.account_id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            subsidiary_type: Set(input.subsidiary_type.into()),
            status: Set(input.status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(subsidiary)
    }

    /// Replaces a subsidiary account's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateCode` or `InvalidReference`.
    pub async fn update_subsidiary_account(
        &self,
        id: Uuid,
        input: SubsidiaryAccountInput,
    ) -> Result<subsidiary_accounts::Model, DimensionRepoError> {
        let txn = self.db.begin().await?;
        let subsidiary = subsidiary_accounts::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DimensionRepoError::NotFound {
                kind: DimensionKind::SubsidiaryAccount,
                id,
            })?;
        if code_taken::<subsidiary_accounts::Entity, _>(
            &txn,
            subsidiary_accounts::Column::Code,
            subsidiary_accounts::Column::Id,
            &input.code,
            Some(id),
        )
        .await?
        {
            return Err(DimensionRepoError::DuplicateCode(input.code));
        }
        ensure_account(&txn, input.account_id).await?;

        let mut active: subsidiary_accounts::ActiveModel = subsidiary.into();
        active.account_id = Set(input.account_id.into_inner());
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.subsidiary_type = Set(input.subsidiary_type.into());
        active.status = Set(input.status.into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a subsidiary account no ledger line is tagged with.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Rule(InUse)` while items reference it.
    pub async fn delete_subsidiary_account(&self, id: Uuid) -> Result<(), DimensionRepoError> {
        let txn = self.db.begin().await?;
        if subsidiary_accounts::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DimensionRepoError::NotFound {
                kind: DimensionKind::SubsidiaryAccount,
                id,
            });
        }
        let used =
            tagged_items(&txn, transaction_items::Column::SubsidiaryAccountId, id).await?;
        DimensionService::ensure_deletable(DimensionKind::SubsidiaryAccount, used)?;

        subsidiary_accounts::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

/// Checks every dimension tag of an item set against the stored rows.
pub(crate) async fn validate_item_tags<E, C>(conn: &C, items: &[LineItemInput]) -> Result<(), E>
where
    E: From<DbErr> + From<DimensionError>,
    C: ConnectionTrait,
{
    let refs = load_tag_refs(conn, items).await?;
    DimensionService::validate_tags(items, |kind, id| refs.get(&(kind, id)).copied())?;
    Ok(())
}

async fn load_tag_refs<C: ConnectionTrait>(
    conn: &C,
    items: &[LineItemInput],
) -> Result<HashMap<(DimensionKind, Uuid), DimensionRef>, DbErr> {
    let mut refs = HashMap::new();

    let ids = DimensionService::referenced(items, DimensionKind::Department);
    if !ids.is_empty() {
        for row in departments::Entity::find()
            .filter(departments::Column::Id.is_in(ids))
            .all(conn)
            .await?
        {
            refs.insert(
                (DimensionKind::Department, row.id),
                DimensionRef { account_id: None },
            );
        }
    }

    let ids = DimensionService::referenced(items, DimensionKind::Project);
    if !ids.is_empty() {
        for row in projects::Entity::find()
            .filter(projects::Column::Id.is_in(ids))
            .all(conn)
            .await?
        {
            refs.insert(
                (DimensionKind::Project, row.id),
                DimensionRef { account_id: None },
            );
        }
    }

    let ids = DimensionService::referenced(items, DimensionKind::SubsidiaryAccount);
    if !ids.is_empty() {
        for row in subsidiary_accounts::Entity::find()
            .filter(subsidiary_accounts::Column::Id.is_in(ids))
            .all(conn)
            .await?
        {
            refs.insert(
                (DimensionKind::SubsidiaryAccount, row.id),
                DimensionRef {
                    account_id: Some(AccountId::from_uuid(row.account_id)),
                },
            );
        }
    }

    Ok(refs)
}

/// True when an account still has subsidiary accounts under it.
pub(crate) async fn has_subsidiaries<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<bool, DbErr> {
    Ok(subsidiary_accounts::Entity::find()
        .filter(subsidiary_accounts::Column::AccountId.eq(account_id))
        .count(conn)
        .await?
        > 0)
}

fn searched<E>(query: Select<E>, term: Option<&str>, code: E::Column, name: E::Column) -> Select<E>
where
    E: EntityTrait,
{
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => {
            let pattern = format!("%{term}%");
            query.filter(
                Condition::any()
                    .add(Expr::col(code).ilike(pattern.clone()))
                    .add(Expr::col(name).ilike(pattern)),
            )
        }
        None => query,
    }
}

async fn paginate<E, C>(
    conn: &C,
    query: Select<E>,
    page: PageRequest,
) -> Result<PageResponse<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = query.clone().count(conn).await?;
    let rows = query
        .offset(page.offset())
        .limit(page.limit())
        .all(conn)
        .await?;
    Ok(PageResponse::new(rows, page, total))
}

async fn code_taken<E, C>(
    conn: &C,
    code_column: E::Column,
    id_column: E::Column,
    code: &str,
    except: Option<Uuid>,
) -> Result<bool, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let mut query = E::find().filter(code_column.eq(code));
    if let Some(id) = except {
        query = query.filter(id_column.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

async fn tagged_items<C: ConnectionTrait>(
    conn: &C,
    column: transaction_items::Column,
    id: Uuid,
) -> Result<bool, DbErr> {
    Ok(transaction_items::Entity::find()
        .filter(column.eq(id))
        .count(conn)
        .await?
        > 0)
}

async fn ensure_department<C: ConnectionTrait>(
    conn: &C,
    department_id: Option<Uuid>,
) -> Result<(), DimensionRepoError> {
    let Some(id) = department_id else {
        return Ok(());
    };
    if departments::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(DimensionRepoError::InvalidReference {
            field: "department_id",
            id,
        });
    }
    Ok(())
}

async fn ensure_account<C: ConnectionTrait>(
    conn: &C,
    account_id: AccountId,
) -> Result<(), DimensionRepoError> {
    let id = account_id.into_inner();
    if accounts::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(DimensionRepoError::InvalidReference {
            field: "account_id",
            id,
        });
    }
    Ok(())
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
