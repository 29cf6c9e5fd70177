//! Department, project and subsidiary account routes.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    response::ApiResponse,
};
use tally_core::dimensions::{DimensionStatus, ProjectStatus, SubsidiaryType};
use tally_db::{
    entities::{departments, projects, subsidiary_accounts},
    repositories::dimension::{
        DIMENSION_PAGE_SIZE, DepartmentDetail, DepartmentInput, DimensionFilter,
        DimensionRepository, ProjectDetail, ProjectInput, SubsidiaryAccountDetail,
        SubsidiaryAccountInput,
    },
};
use tally_shared::{
    AppError,
    types::{AccountId, PageRequest},
};

/// Creates the dimension routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/{department_id}",
            get(get_department)
                .put(update_department)
                .delete(delete_department),
        )
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{project_id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route(
            "/subsidiary-accounts",
            get(list_subsidiary_accounts).post(create_subsidiary_account),
        )
        .route(
            "/subsidiary-accounts/{subsidiary_account_id}",
            get(get_subsidiary_account)
                .put(update_subsidiary_account)
                .delete(delete_subsidiary_account),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters shared by the dimension lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListDimensionsQuery {
    /// Substring of code or name.
    pub search: Option<String>,
    /// Status name.
    pub status: Option<String>,
    /// Projects: owning department.
    pub department_id: Option<Uuid>,
    /// Subsidiary accounts: parent chart account.
    pub account_id: Option<AccountId>,
    /// Subsidiary accounts: type name.
    #[serde(rename = "type")]
    pub subsidiary_type: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u64>,
}

impl ListDimensionsQuery {
    fn split(self) -> (DimensionFilter, PageRequest) {
        let page = PageRequest::from_query(self.page, self.per_page, DIMENSION_PAGE_SIZE);
        let filter = DimensionFilter {
            search: self.search,
            status: self.status,
            department_id: self.department_id,
            account_id: self.account_id,
            subsidiary_type: self.subsidiary_type,
        };
        (filter, page)
    }
}

/// Request body for creating or replacing a department.
#[derive(Debug, Deserialize, Validate)]
pub struct DepartmentRequest {
    /// Unique code.
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Manager.
    #[validate(length(max = 255))]
    pub manager_name: Option<String>,
    /// Budget, at least 0.
    #[validate(custom(function = "super::budget_amount"))]
    pub budget: Option<Decimal>,
    /// `active` or `inactive`.
    pub status: String,
}

/// Request body for creating or replacing a project.
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    /// Unique code.
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Owning department.
    pub department_id: Option<Uuid>,
    /// Project manager.
    #[validate(length(max = 255))]
    pub project_manager: Option<String>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date, on or after the start date.
    pub end_date: Option<NaiveDate>,
    /// Budget, at least 0.
    #[validate(custom(function = "super::budget_amount"))]
    pub budget: Option<Decimal>,
    /// planning, active, paused, completed or cancelled.
    pub status: String,
}

/// Request body for creating or replacing a subsidiary account.
#[derive(Debug, Deserialize, Validate)]
pub struct SubsidiaryAccountRequest {
    /// Chart account it hangs under.
    pub account_id: AccountId,
    /// Unique code.
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// cost_center, profit_center, branch, division or custom.
    #[serde(rename = "type")]
    pub subsidiary_type: String,
    /// `active` or `inactive`.
    pub status: String,
}

fn parse_choice<T>(field: &str, raw: &str, parse: fn(&str) -> Option<T>) -> Result<T, ApiError> {
    parse(raw).ok_or_else(|| {
        AppError::Validation(format!("The selected {field} '{raw}' is invalid")).into()
    })
}

impl TryFrom<DepartmentRequest> for DepartmentInput {
    type Error = ApiError;

    fn try_from(payload: DepartmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_choice("status", &payload.status, DimensionStatus::parse)?,
            code: payload.code.trim().to_string(),
            name: payload.name.trim().to_string(),
            description: payload.description,
            manager_name: payload.manager_name,
            budget: payload.budget,
        })
    }
}

impl TryFrom<ProjectRequest> for ProjectInput {
    type Error = ApiError;

    fn try_from(payload: ProjectRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_choice("status", &payload.status, ProjectStatus::parse)?,
            code: payload.code.trim().to_string(),
            name: payload.name.trim().to_string(),
            description: payload.description,
            department_id: payload.department_id,
            project_manager: payload.project_manager,
            start_date: payload.start_date,
            end_date: payload.end_date,
            budget: payload.budget,
        })
    }
}

impl TryFrom<SubsidiaryAccountRequest> for SubsidiaryAccountInput {
    type Error = ApiError;

    fn try_from(payload: SubsidiaryAccountRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            subsidiary_type: parse_choice("type", &payload.subsidiary_type, SubsidiaryType::parse)?,
            status: parse_choice("status", &payload.status, DimensionStatus::parse)?,
            account_id: payload.account_id,
            code: payload.code.trim().to_string(),
            name: payload.name.trim().to_string(),
            description: payload.description,
        })
    }
}

// ============================================================================
// Departments
// ============================================================================

/// GET `/departments` - Paginated, searchable list.
async fn list_departments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListDimensionsQuery>,
) -> Result<ApiResponse<Vec<departments::Model>>, ApiError> {
    let (filter, page) = query.split();
    let repo = DimensionRepository::new((*state.db).clone());
    Ok(ApiResponse::paginated(repo.list_departments(filter, page).await?))
}

/// POST `/departments` - Create a department.
async fn create_department(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<DepartmentRequest>,
) -> Result<ApiResponse<departments::Model>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    let department = repo.create_department(payload.try_into()?).await?;

    info!(department_id = %department.id, code = %department.code, user_id = %auth.user_id(), "Department created");
    Ok(ApiResponse::created(department).with_message("Department created successfully"))
}

/// GET `/departments/{department_id}` - Department with its projects.
async fn get_department(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(department_id): Path<Uuid>,
) -> Result<ApiResponse<DepartmentDetail>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.find_department(department_id).await?))
}

/// PUT `/departments/{department_id}` - Replace a department.
async fn update_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(department_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DepartmentRequest>,
) -> Result<ApiResponse<departments::Model>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    let department = repo
        .update_department(department_id, payload.try_into()?)
        .await?;

    info!(department_id = %department.id, user_id = %auth.user_id(), "Department updated");
    Ok(ApiResponse::ok(department).with_message("Department updated successfully"))
}

/// DELETE `/departments/{department_id}` - Only departments no item is tagged with.
async fn delete_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(department_id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    repo.delete_department(department_id)
        .await
        .inspect_err(|e| warn!(department_id = %department_id, error = %e, "Department delete refused"))?;

    info!(department_id = %department_id, user_id = %auth.user_id(), "Department deleted");
    Ok(ApiResponse::message_only("Department deleted successfully"))
}

// ============================================================================
// Projects
// ============================================================================

/// GET `/projects` - Paginated, searchable list.
async fn list_projects(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListDimensionsQuery>,
) -> Result<ApiResponse<Vec<projects::Model>>, ApiError> {
    let (filter, page) = query.split();
    let repo = DimensionRepository::new((*state.db).clone());
    Ok(ApiResponse::paginated(repo.list_projects(filter, page).await?))
}

/// POST `/projects` - Create a project.
async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ProjectRequest>,
) -> Result<ApiResponse<projects::Model>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    let project = repo.create_project(payload.try_into()?).await?;

    info!(project_id = %project.id, code = %project.code, user_id = %auth.user_id(), "Project created");
    Ok(ApiResponse::created(project).with_message("Project created successfully"))
}

/// GET `/projects/{project_id}` - Project with its department.
async fn get_project(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<ApiResponse<ProjectDetail>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.find_project(project_id).await?))
}

/// PUT `/projects/{project_id}` - Replace a project.
async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProjectRequest>,
) -> Result<ApiResponse<projects::Model>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    let project = repo.update_project(project_id, payload.try_into()?).await?;

    info!(project_id = %project.id, user_id = %auth.user_id(), "Project updated");
    Ok(ApiResponse::ok(project).with_message("Project updated successfully"))
}

/// DELETE `/projects/{project_id}` - Only projects no item is tagged with.
async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    repo.delete_project(project_id)
        .await
        .inspect_err(|e| warn!(project_id = %project_id, error = %e, "Project delete refused"))?;

    info!(project_id = %project_id, user_id = %auth.user_id(), "Project deleted");
    Ok(ApiResponse::message_only("Project deleted successfully"))
}

// ============================================================================
// Subsidiary accounts
// ============================================================================

/// GET `/subsidiary-accounts` - Paginated, searchable list.
async fn list_subsidiary_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListDimensionsQuery>,
) -> Result<ApiResponse<Vec<subsidiary_accounts::Model>>, ApiError> {
    let (filter, page) = query.split();
    let repo = DimensionRepository::new((*state.db).clone());
    Ok(ApiResponse::paginated(
        repo.list_subsidiary_accounts(filter, page).await?,
    ))
}

/// POST `/subsidiary-accounts` - Create a subsidiary account.
async fn create_subsidiary_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<SubsidiaryAccountRequest>,
) -> Result<ApiResponse<subsidiary_accounts::Model>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    let subsidiary = repo.create_subsidiary_account(payload.try_into()?).await?;

    info!(
        subsidiary_account_id = %subsidiary.id,
        account_id = %subsidiary.account_id,
        user_id = %auth.user_id(),
        "Subsidiary account created"
    );
    Ok(ApiResponse::created(subsidiary).with_message("Subsidiary account created successfully"))
}

/// GET `/subsidiary-accounts/{subsidiary_account_id}` - With its chart account.
async fn get_subsidiary_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(subsidiary_account_id): Path<Uuid>,
) -> Result<ApiResponse<SubsidiaryAccountDetail>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(
        repo.find_subsidiary_account(subsidiary_account_id).await?,
    ))
}

/// PUT `/subsidiary-accounts/{subsidiary_account_id}` - Replace a subsidiary account.
async fn update_subsidiary_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(subsidiary_account_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SubsidiaryAccountRequest>,
) -> Result<ApiResponse<subsidiary_accounts::Model>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    let subsidiary = repo
        .update_subsidiary_account(subsidiary_account_id, payload.try_into()?)
        .await?;

    info!(subsidiary_account_id = %subsidiary.id, user_id = %auth.user_id(), "Subsidiary account updated");
    Ok(ApiResponse::ok(subsidiary).with_message("Subsidiary account updated successfully"))
}

/// DELETE `/subsidiary-accounts/{subsidiary_account_id}` - Only unused ones.
async fn delete_subsidiary_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(subsidiary_account_id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = DimensionRepository::new((*state.db).clone());
    repo.delete_subsidiary_account(subsidiary_account_id)
        .await
        .inspect_err(|e| {
            warn!(subsidiary_account_id = %subsidiary_account_id, error = %e, "Subsidiary account delete refused");
        })?;

    info!(subsidiary_account_id = %subsidiary_account_id, user_id = %auth.user_id(), "Subsidiary account deleted");
    Ok(ApiResponse::message_only("Subsidiary account deleted successfully"))
}
