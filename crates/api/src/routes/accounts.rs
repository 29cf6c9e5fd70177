//! Chart of accounts routes.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    response::ApiResponse,
};
use tally_core::accounts::{AccountNode, AccountService};
use tally_db::{
    entities::accounts,
    repositories::account::{
        ACCOUNT_PAGE_SIZE, AccountDetail, AccountFilter, AccountRepository, CreateAccountInput,
        UpdateAccountInput,
    },
};
use tally_shared::types::{AccountId, PageRequest};

/// Creates the account routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/hierarchy", get(hierarchy))
        .route(
            "/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    /// Substring of code or name.
    pub search: Option<String>,
    /// Account type, case-insensitive.
    pub account_type: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// One of `code`, `name`, `account_type`, `created_at`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size (default 15, max 100).
    pub per_page: Option<u64>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Unique account code.
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// asset, liability, equity, revenue (or income), expense.
    pub account_type: String,
    /// Parent account.
    pub parent_id: Option<AccountId>,
    /// Free text.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Defaults to true.
    pub is_active: Option<bool>,
}

/// Request body for updating an account. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    /// Unique account code.
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub code: Option<String>,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: Option<String>,
    /// New account type.
    pub account_type: Option<String>,
    /// `null` detaches the account from its parent.
    #[serde(default, deserialize_with = "super::nullable")]
    pub parent_id: Option<Option<AccountId>>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    /// Active flag.
    pub is_active: Option<bool>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts` - Paginated, searchable list.
async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> Result<ApiResponse<Vec<accounts::Model>>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    let page = PageRequest::from_query(query.page, query.per_page, ACCOUNT_PAGE_SIZE);
    let filter = AccountFilter {
        search: query.search,
        account_type: query.account_type,
        is_active: query.is_active,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
    };

    let accounts = repo.list_accounts(filter, page).await?;
    Ok(ApiResponse::paginated(accounts))
}

/// GET `/accounts/hierarchy` - Nested tree of active accounts.
async fn hierarchy(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<Vec<AccountNode>>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.hierarchy().await?))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> Result<ApiResponse<accounts::Model>, ApiError> {
    let account_type = AccountService::parse_type(&payload.account_type)?;
    let repo = AccountRepository::new((*state.db).clone());

    let account = repo
        .create_account(CreateAccountInput {
            code: payload.code.trim().to_string(),
            name: payload.name.trim().to_string(),
            account_type,
            parent_id: payload.parent_id,
            description: payload.description,
            is_active: payload.is_active.unwrap_or(true),
        })
        .await?;

    info!(
        account_id = %account.id,
        code = %account.code,
        user_id = %auth.user_id(),
        "Account created"
    );
    Ok(ApiResponse::created(account).with_message("Account created successfully"))
}

/// GET `/accounts/{account_id}` - Account with its parent and children.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<ApiResponse<AccountDetail>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.find_account(account_id).await?))
}

/// PUT `/accounts/{account_id}` - Partial update.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> Result<ApiResponse<accounts::Model>, ApiError> {
    let account_type = payload
        .account_type
        .as_deref()
        .map(AccountService::parse_type)
        .transpose()?;
    let repo = AccountRepository::new((*state.db).clone());

    let account = repo
        .update_account(
            account_id,
            UpdateAccountInput {
                code: payload.code.map(|c| c.trim().to_string()),
                name: payload.name.map(|n| n.trim().to_string()),
                account_type,
                parent_id: payload.parent_id,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;

    info!(account_id = %account.id, user_id = %auth.user_id(), "Account updated");
    Ok(ApiResponse::ok(account).with_message("Account updated successfully"))
}

/// DELETE `/accounts/{account_id}` - Only accounts with no children and no postings.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());

    repo.delete_account(account_id)
        .await
        .inspect_err(|e| warn!(account_id = %account_id, error = %e, "Account delete refused"))?;

    info!(account_id = %account_id, user_id = %auth.user_id(), "Account deleted");
    Ok(ApiResponse::message_only("Account deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UpdateAccountRequest = serde_json::from_str(r#"{"name":"Cash"}"#).unwrap();
        assert_eq!(absent.parent_id, None);
        assert_eq!(absent.description, None);

        let cleared: UpdateAccountRequest =
            serde_json::from_str(r#"{"parent_id":null,"description":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));
        assert_eq!(cleared.description, Some(None));
    }

    #[test]
    fn test_create_rejects_empty_code() {
        let request: CreateAccountRequest =
            serde_json::from_str(r#"{"code":"","name":"Cash","account_type":"asset"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
    }
}
