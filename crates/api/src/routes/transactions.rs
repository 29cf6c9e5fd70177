//! Transaction routes: CRUD plus the approval workflow.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
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
use tally_core::{
    ledger::{DimensionTags, EntryType, LineItemInput},
    workflow::{TransactionStatus, TransactionType, WorkflowService},
};
use tally_db::{
    entities::transactions,
    repositories::transaction::{
        CreateTransactionInput, MetadataPatch, TRANSACTION_PAGE_SIZE, TransactionDetail,
        TransactionFilter, TransactionMetadata, TransactionRepository, UpdateTransactionInput,
    },
};
use tally_shared::{
    AppError,
    types::{AccountId, PageRequest, TransactionId},
};

/// Creates the transaction routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{transaction_id}/approve", post(approve_transaction))
        .route("/transactions/{transaction_id}/reject", post(reject_transaction))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// Substring of reference or description.
    pub search: Option<String>,
    /// Filter by transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
    /// Earliest transaction date (YYYY-MM-DD).
    pub start_date: Option<NaiveDate>,
    /// Latest transaction date (YYYY-MM-DD).
    pub end_date: Option<NaiveDate>,
    /// One of `reference`, `type`, `status`, `amount`, `transaction_date`, `created_at`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u64>,
}

/// One line of a transaction body.
#[derive(Debug, Deserialize, Validate)]
pub struct LineItemRequest {
    /// Account posted to.
    pub account_id: AccountId,
    /// `debit` or `credit`.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Strictly positive amount in whole cents.
    #[validate(custom(function = "super::money_amount"))]
    pub amount: Decimal,
    /// Line memo.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Department dimension.
    pub department_id: Option<Uuid>,
    /// Project dimension.
    pub project_id: Option<Uuid>,
    /// Subsidiary ledger account.
    pub subsidiary_account_id: Option<Uuid>,
}

impl From<LineItemRequest> for LineItemInput {
    fn from(item: LineItemRequest) -> Self {
        Self {
            account_id: item.account_id,
            entry_type: item.entry_type,
            amount: item.amount,
            description: item.description,
            dimensions: DimensionTags {
                department_id: item.department_id,
                project_id: item.project_id,
                subsidiary_account_id: item.subsidiary_account_id,
            },
        }
    }
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    /// Unique reference.
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub reference: String,
    /// Booking date.
    pub transaction_date: NaiveDate,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// `draft` (default), `pending`, `approved` or `rejected`.
    pub status: Option<String>,
    /// Declared total.
    #[validate(custom(function = "super::money_amount"))]
    pub amount: Decimal,
    /// Free text.
    pub description: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Check number.
    #[validate(length(max = 50))]
    pub check_number: Option<String>,
    /// Check date.
    pub check_date: Option<NaiveDate>,
    /// Bank name.
    #[validate(length(max = 255))]
    pub bank: Option<String>,
    /// Payee.
    #[validate(length(max = 255))]
    pub payee: Option<String>,
    /// Line items.
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
}

/// Request body for updating a draft. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTransactionRequest {
    /// New reference.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub reference: Option<String>,
    /// New booking date.
    pub transaction_date: Option<NaiveDate>,
    /// New type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// `draft` or `pending`.
    pub status: Option<String>,
    /// New declared total.
    #[validate(custom(function = "super::money_amount"))]
    pub amount: Option<Decimal>,
    /// `null` clears it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    /// `null` clears it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub notes: Option<Option<String>>,
    /// `null` clears it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub check_number: Option<Option<String>>,
    /// `null` clears it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub check_date: Option<Option<NaiveDate>>,
    /// `null` clears it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub bank: Option<Option<String>>,
    /// `null` clears it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub payee: Option<Option<String>>,
    /// Replaces every existing item when present.
    #[validate(nested)]
    pub items: Option<Vec<LineItemRequest>>,
}

/// Request body for rejecting a transaction.
#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    /// Why the transaction is rejected; required.
    #[serde(default)]
    pub reason: String,
}

fn parse_type(raw: &str) -> Result<TransactionType, ApiError> {
    TransactionType::parse(raw)
        .ok_or_else(|| AppError::Validation(format!("The selected type '{raw}' is invalid")).into())
}

fn parse_status(raw: &str) -> Result<TransactionStatus, ApiError> {
    TransactionStatus::parse(raw)
        .ok_or_else(|| AppError::Validation(format!("The selected status '{raw}' is invalid")).into())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - Paginated, filterable list.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<ApiResponse<Vec<transactions::Model>>, ApiError> {
    let filter = TransactionFilter {
        search: query.search,
        transaction_type: query.transaction_type.as_deref().map(parse_type).transpose()?,
        status: query.status.as_deref().map(parse_status).transpose()?,
        start_date: query.start_date,
        end_date: query.end_date,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
    };
    let page = PageRequest::from_query(query.page, query.per_page, TRANSACTION_PAGE_SIZE);

    let repo = TransactionRepository::new((*state.db).clone());
    Ok(ApiResponse::paginated(repo.list_transactions(filter, page).await?))
}

/// POST `/transactions` - Create a balanced transaction with its items.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateTransactionRequest>,
) -> Result<ApiResponse<TransactionDetail>, ApiError> {
    let transaction_type = parse_type(&payload.transaction_type)?;
    let requested = payload.status.as_deref().map(parse_status).transpose()?;
    let status = WorkflowService::initial_status(requested);

    let input = CreateTransactionInput {
        reference: payload.reference.trim().to_string(),
        transaction_date: payload.transaction_date,
        transaction_type,
        status,
        amount: payload.amount,
        metadata: TransactionMetadata {
            description: payload.description,
            notes: payload.notes,
            check_number: payload.check_number,
            check_date: payload.check_date,
            bank: payload.bank,
            payee: payload.payee,
        },
        items: payload.items.into_iter().map(LineItemInput::from).collect(),
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let detail = repo
        .create_transaction(auth.user_id(), input)
        .await
        .inspect_err(|e| warn!(error = %e, "Transaction rejected"))?;

    info!(
        transaction_id = %detail.transaction.id,
        reference = %detail.transaction.reference,
        items = detail.items.len(),
        user_id = %auth.user_id(),
        "Transaction created"
    );
    Ok(ApiResponse::created(detail).with_message("Transaction created successfully"))
}

/// GET `/transactions/{transaction_id}` - Transaction with items and accounts.
async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<ApiResponse<TransactionDetail>, ApiError> {
    let repo = TransactionRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.find_transaction(transaction_id).await?))
}

/// PUT `/transactions/{transaction_id}` - Edit a draft.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
    ValidatedJson(payload): ValidatedJson<UpdateTransactionRequest>,
) -> Result<ApiResponse<TransactionDetail>, ApiError> {
    let input = UpdateTransactionInput {
        reference: payload.reference.map(|r| r.trim().to_string()),
        transaction_date: payload.transaction_date,
        transaction_type: payload.transaction_type.as_deref().map(parse_type).transpose()?,
        status: payload.status.as_deref().map(parse_status).transpose()?,
        amount: payload.amount,
        metadata: MetadataPatch {
            description: payload.description,
            notes: payload.notes,
            check_number: payload.check_number,
            check_date: payload.check_date,
            bank: payload.bank,
            payee: payload.payee,
        },
        items: payload
            .items
            .map(|items| items.into_iter().map(LineItemInput::from).collect()),
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let detail = repo
        .update_transaction(transaction_id, input)
        .await
        .inspect_err(|e| warn!(transaction_id = %transaction_id, error = %e, "Update refused"))?;

    info!(transaction_id = %transaction_id, user_id = %auth.user_id(), "Transaction updated");
    Ok(ApiResponse::ok(detail).with_message("Transaction updated successfully"))
}

/// DELETE `/transactions/{transaction_id}` - Remove a draft or rejected transaction.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = TransactionRepository::new((*state.db).clone());
    let attachment = repo
        .delete_transaction(transaction_id)
        .await
        .inspect_err(|e| warn!(transaction_id = %transaction_id, error = %e, "Delete refused"))?;

    if let Some(path) = attachment
        && let Err(e) = state.storage.delete(&path).await
    {
        warn!(transaction_id = %transaction_id, path = %path, error = %e, "Orphaned attachment");
    }

    info!(transaction_id = %transaction_id, user_id = %auth.user_id(), "Transaction deleted");
    Ok(ApiResponse::message_only("Transaction deleted successfully"))
}

/// POST `/transactions/{transaction_id}/approve` - Pending to approved.
async fn approve_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<ApiResponse<TransactionDetail>, ApiError> {
    let repo = TransactionRepository::new((*state.db).clone());
    let detail = repo
        .approve_transaction(transaction_id, auth.user_id())
        .await
        .inspect_err(|e| warn!(transaction_id = %transaction_id, error = %e, "Approval refused"))?;

    info!(transaction_id = %transaction_id, approved_by = %auth.user_id(), "Transaction approved");
    Ok(ApiResponse::ok(detail).with_message("Transaction approved successfully"))
}

/// POST `/transactions/{transaction_id}/reject` - Pending to rejected, with a reason.
async fn reject_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
    ValidatedJson(payload): ValidatedJson<RejectRequest>,
) -> Result<ApiResponse<TransactionDetail>, ApiError> {
    let repo = TransactionRepository::new((*state.db).clone());
    let detail = repo
        .reject_transaction(transaction_id, &payload.reason)
        .await
        .inspect_err(|e| warn!(transaction_id = %transaction_id, error = %e, "Rejection refused"))?;

    info!(transaction_id = %transaction_id, user_id = %auth.user_id(), "Transaction rejected");
    Ok(ApiResponse::ok(detail).with_message("Transaction rejected"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_item_maps_dimensions() {
        let request: LineItemRequest = serde_json::from_value(serde_json::json!({
            "account_id": Uuid::nil(),
            "type": "credit",
            "amount": "125.50",
            "project_id": Uuid::nil(),
        }))
        .unwrap();
        let item = LineItemInput::from(request);

        assert_eq!(item.entry_type, EntryType::Credit);
        assert_eq!(item.amount, dec!(125.50));
        assert_eq!(item.dimensions.project_id, Some(Uuid::nil()));
        assert_eq!(item.dimensions.department_id, None);
    }

    #[test]
    fn test_zero_amount_is_invalid() {
        let request: CreateTransactionRequest = serde_json::from_value(serde_json::json!({
            "reference": "JV-0",
            "transaction_date": "2026-03-01",
            "type": "journal",
            "amount": "0",
            "items": [],
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_sub_cent_item_amount_is_invalid() {
        let request: CreateTransactionRequest = serde_json::from_value(serde_json::json!({
            "reference": "JV-2",
            "transaction_date": "2026-03-01",
            "type": "journal",
            "amount": "1.00",
            "items": [
                { "account_id": Uuid::nil(), "type": "debit", "amount": "0.335" },
                { "account_id": Uuid::nil(), "type": "credit", "amount": "0.335" },
            ],
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_accepts_approved_status() {
        assert_eq!(parse_status("approved").unwrap(), TransactionStatus::Approved);
        assert_eq!(
            WorkflowService::initial_status(Some(parse_status("rejected").unwrap())),
            TransactionStatus::Rejected
        );
    }

    #[test]
    fn test_negative_amount_is_invalid() {
        let request: CreateTransactionRequest = serde_json::from_value(serde_json::json!({
            "reference": "JV-1",
            "transaction_date": "2026-03-01",
            "type": "journal",
            "amount": "-1",
            "items": [],
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[rstest]
    #[case("receipt", TransactionType::Receipt)]
    #[case("journal", TransactionType::Journal)]
    #[case("cash_receipt", TransactionType::CashReceipt)]
    #[case("bank_transfer", TransactionType::BankTransfer)]
    fn test_parse_type(#[case] raw: &str, #[case] expected: TransactionType) {
        assert_eq!(parse_type(raw).unwrap(), expected);
    }

    #[test]
    fn test_unknown_type_is_validation_error() {
        let err = parse_type("barter").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_update_metadata_patch() {
        let request: UpdateTransactionRequest =
            serde_json::from_str(r#"{"notes":null,"payee":"Acme"}"#).unwrap();
        assert_eq!(request.notes, Some(None));
        assert_eq!(request.payee, Some(Some("Acme".to_string())));
        assert_eq!(request.bank, None);
        assert!(request.items.is_none());
    }
}
