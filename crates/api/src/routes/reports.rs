//! Read-only ledger reports. Every status is included.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};

use crate::{AppState, error::ApiError, middleware::AuthUser, response::ApiResponse};
use tally_core::reports::{GeneralLedgerReport, GlSummaryReport, TrialBalanceReport};
use tally_db::ReportRepository;
use tally_shared::types::AccountId;

/// Creates the report routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trial-balance", get(trial_balance))
        .route("/reports/gl-summary", get(gl_summary))
        .route("/reports/gl/{account_id}", get(general_ledger))
}

/// GET `/reports/trial-balance`
async fn trial_balance(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<TrialBalanceReport>, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.trial_balance().await?))
}

/// GET `/reports/gl-summary`
async fn gl_summary(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<GlSummaryReport>, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.gl_summary().await?))
}

/// GET `/reports/gl/{account_id}` - Running balance of one account.
async fn general_ledger(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<ApiResponse<GeneralLedgerReport>, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.general_ledger(account_id).await?))
}
