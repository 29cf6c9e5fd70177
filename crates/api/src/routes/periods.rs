//! Accounting period routes.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    response::ApiResponse,
};
use tally_db::{
    entities::periods,
    repositories::period::{PeriodInput, PeriodRepository},
};
use tally_shared::types::PeriodId;

/// Creates the period routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/periods", get(list_periods).post(create_period))
        .route(
            "/periods/{period_id}",
            get(get_period).put(update_period).delete(delete_period),
        )
        .route("/periods/{period_id}/close", post(close_period))
}

/// Request body for creating or replacing a period.
#[derive(Debug, Deserialize, Validate)]
pub struct PeriodRequest {
    /// Unique name, e.g. "March 2026".
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, on or after `start_date`.
    pub end_date: NaiveDate,
    /// Free text.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl From<PeriodRequest> for PeriodInput {
    fn from(payload: PeriodRequest) -> Self {
        Self {
            name: payload.name.trim().to_string(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            notes: payload.notes,
        }
    }
}

/// GET `/periods` - Every period, latest first.
async fn list_periods(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<ApiResponse<Vec<periods::Model>>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.list_periods().await?))
}

/// POST `/periods` - Create an open period.
async fn create_period(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<PeriodRequest>,
) -> Result<ApiResponse<periods::Model>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    let period = repo.create_period(payload.into()).await?;

    info!(period_id = %period.id, name = %period.name, user_id = %auth.user_id(), "Period created");
    Ok(ApiResponse::created(period).with_message("Period created successfully"))
}

async fn get_period(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(period_id): Path<PeriodId>,
) -> Result<ApiResponse<periods::Model>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.find_period(period_id).await?))
}

/// PUT `/periods/{period_id}` - Replace name, dates and notes.
async fn update_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<PeriodId>,
    ValidatedJson(payload): ValidatedJson<PeriodRequest>,
) -> Result<ApiResponse<periods::Model>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    let period = repo.update_period(period_id, payload.into()).await?;

    info!(period_id = %period.id, user_id = %auth.user_id(), "Period updated");
    Ok(ApiResponse::ok(period).with_message("Period updated successfully"))
}

/// POST `/periods/{period_id}/close` - Close an open period for postings.
async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<PeriodId>,
) -> Result<ApiResponse<periods::Model>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    let period = repo
        .close_period(period_id)
        .await
        .inspect_err(|e| warn!(period_id = %period_id, error = %e, "Period close refused"))?;

    info!(period_id = %period_id, user_id = %auth.user_id(), "Period closed");
    Ok(ApiResponse::ok(period).with_message("Period closed successfully"))
}

/// DELETE `/periods/{period_id}` - Only open periods.
async fn delete_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<PeriodId>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    repo.delete_period(period_id).await?;

    info!(period_id = %period_id, user_id = %auth.user_id(), "Period deleted");
    Ok(ApiResponse::message_only("Period deleted successfully"))
}
