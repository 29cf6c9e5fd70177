//! Per-user settings.

use std::collections::BTreeMap;

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    response::ApiResponse,
};
use tally_db::{SettingsRepository, repositories::GlAccounts};
use tally_shared::types::AccountId;

/// Creates the settings routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(all_settings))
        .route(
            "/settings/gl-accounts",
            get(gl_accounts).put(update_gl_accounts),
        )
}

/// Request body for the default GL accounts; `null` or absent unsets a role.
#[derive(Debug, Deserialize, Validate)]
pub struct GlAccountsRequest {
    /// Accounts receivable.
    pub ar_account_id: Option<AccountId>,
    /// Accounts payable.
    pub ap_account_id: Option<AccountId>,
}

/// GET `/settings` - Every key of the caller.
async fn all_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<BTreeMap<String, Option<String>>>, ApiError> {
    let repo = SettingsRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.all(auth.user_id()).await?))
}

/// GET `/settings/gl-accounts`
async fn gl_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<GlAccounts>, ApiError> {
    let repo = SettingsRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.gl_accounts(auth.user_id()).await?))
}

/// PUT `/settings/gl-accounts` - Referenced accounts must exist.
async fn update_gl_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<GlAccountsRequest>,
) -> Result<ApiResponse<GlAccounts>, ApiError> {
    let repo = SettingsRepository::new((*state.db).clone());
    let saved = repo
        .set_gl_accounts(
            auth.user_id(),
            GlAccounts {
                ar_account_id: payload.ar_account_id,
                ap_account_id: payload.ap_account_id,
            },
        )
        .await?;

    info!(user_id = %auth.user_id(), "GL account settings updated");
    Ok(ApiResponse::ok(saved).with_message("GL account settings saved successfully"))
}
