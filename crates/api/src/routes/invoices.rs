//! Invoice routes, including finalization and payments.
//!
//! Invoices belong to the user that created them. Finalizing books the
//! receivable, recording a payment books the cash receipt, both inside the
//! same unit of work as the invoice update.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    response::ApiResponse,
};
use tally_core::{
    accounts::PaymentMethod,
    invoicing::{AgingSummary, InvoiceLine, InvoiceStatus, PaymentInput},
};
use tally_db::{
    entities::invoices,
    repositories::invoice::{
        INVOICE_PAGE_SIZE, InvoiceDetail, InvoiceFilter, InvoiceInput, InvoiceRepository,
    },
};
use tally_shared::{
    AppError,
    types::{AccountId, InvoiceId, PageRequest, TransactionId},
};

/// Creates the invoice routes (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/aging", get(aging_report))
        .route(
            "/invoices/{invoice_id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{invoice_id}/send", post(send_invoice))
        .route("/invoices/{invoice_id}/finalize", post(finalize_invoice))
        .route("/invoices/{invoice_id}/record-payment", post(record_payment))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing invoices.
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    /// Substring of the customer name.
    pub customer_name: Option<String>,
    /// Exact status.
    pub status: Option<String>,
    /// Earliest invoice date.
    pub from_date: Option<NaiveDate>,
    /// Latest invoice date.
    pub to_date: Option<NaiveDate>,
    /// Whitelisted sort column.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size (default 15, max 100).
    pub per_page: Option<u64>,
}

/// One invoice line.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct InvoiceLineRequest {
    /// What was sold.
    #[validate(length(min = 1, max = 500, message = "is required"))]
    pub description: String,
    /// At least 0.01.
    pub quantity: Decimal,
    /// Not negative.
    #[validate(custom(function = "super::non_negative"))]
    pub unit_price: Decimal,
    /// Revenue account credited on finalize.
    pub account_id: Option<AccountId>,
}

impl From<InvoiceLineRequest> for InvoiceLine {
    fn from(line: InvoiceLineRequest) -> Self {
        Self {
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
            account_id: line.account_id,
        }
    }
}

/// Body of create and update; update replaces every field and line.
#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceRequest {
    /// Unique invoice number.
    #[validate(length(min = 1, max = 50, message = "is required"))]
    pub invoice_number: String,
    /// Customer name.
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub customer_name: String,
    /// Customer e-mail.
    #[validate(email)]
    pub customer_email: Option<String>,
    /// Customer phone.
    #[validate(length(max = 50))]
    pub customer_phone: Option<String>,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Due date, on or after the issue date.
    pub due_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// At least one line.
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub items: Vec<InvoiceLineRequest>,
}

impl From<InvoiceRequest> for InvoiceInput {
    fn from(request: InvoiceRequest) -> Self {
        Self {
            invoice_number: request.invoice_number.trim().to_string(),
            customer_name: request.customer_name.trim().to_string(),
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            invoice_date: request.invoice_date,
            due_date: request.due_date,
            notes: request.notes,
            lines: request.items.into_iter().map(InvoiceLine::from).collect(),
        }
    }
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    /// Amount received, at least 0.01.
    #[validate(custom(function = "super::money_amount"))]
    pub amount: Decimal,
    /// Date received.
    pub payment_date: NaiveDate,
    /// cash, check, bank_transfer, credit_card or any other label.
    #[validate(length(min = 1, max = 50, message = "is required"))]
    pub payment_method: String,
}

/// Invoice together with the ledger transaction a bridge operation booked.
#[derive(Debug, Serialize)]
pub struct PostedInvoice {
    /// Invoice after the operation.
    pub invoice: InvoiceDetail,
    /// Generated transaction.
    pub transaction_id: TransactionId,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/invoices` - The caller's invoices.
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<ApiResponse<Vec<invoices::Model>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            InvoiceStatus::parse(raw).ok_or_else(|| {
                ApiError::from(AppError::Validation(format!(
                    "The selected status '{raw}' is invalid"
                )))
            })
        })
        .transpose()?;
    let filter = InvoiceFilter {
        customer_name: query.customer_name,
        status,
        from_date: query.from_date,
        to_date: query.to_date,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
    };
    let page = PageRequest::from_query(query.page, query.per_page, INVOICE_PAGE_SIZE);

    let repo = InvoiceRepository::new((*state.db).clone());
    Ok(ApiResponse::paginated(
        repo.list_invoices(auth.user_id(), filter, page).await?,
    ))
}

/// POST `/invoices` - Create a draft invoice.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<InvoiceRequest>,
) -> Result<ApiResponse<InvoiceDetail>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let detail = repo
        .create_invoice(auth.user_id(), payload.into(), today())
        .await?;

    info!(
        invoice_id = %detail.invoice.id,
        invoice_number = %detail.invoice.invoice_number,
        total = %detail.invoice.total_amount,
        user_id = %auth.user_id(),
        "Invoice created"
    );
    Ok(ApiResponse::created(detail).with_message("Invoice created successfully"))
}

/// GET `/invoices/aging` - Outstanding balances by age.
async fn aging_report(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<AgingSummary>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(repo.aging(auth.user_id(), today()).await?))
}

/// GET `/invoices/{invoice_id}` - Invoice with lines and derived figures.
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<ApiResponse<InvoiceDetail>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    Ok(ApiResponse::ok(
        repo.find_invoice(auth.user_id(), invoice_id, today()).await?,
    ))
}

/// PUT `/invoices/{invoice_id}` - Replace a draft.
async fn update_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    ValidatedJson(payload): ValidatedJson<InvoiceRequest>,
) -> Result<ApiResponse<InvoiceDetail>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let detail = repo
        .update_invoice(auth.user_id(), invoice_id, payload.into(), today())
        .await
        .inspect_err(|e| warn!(invoice_id = %invoice_id, error = %e, "Invoice update refused"))?;

    info!(invoice_id = %invoice_id, user_id = %auth.user_id(), "Invoice updated");
    Ok(ApiResponse::ok(detail).with_message("Invoice updated successfully"))
}

/// DELETE `/invoices/{invoice_id}` - Delete a draft.
async fn delete_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<ApiResponse<()>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.delete_invoice(auth.user_id(), invoice_id)
        .await
        .inspect_err(|e| warn!(invoice_id = %invoice_id, error = %e, "Invoice delete refused"))?;

    info!(invoice_id = %invoice_id, user_id = %auth.user_id(), "Invoice deleted");
    Ok(ApiResponse::message_only("Invoice deleted successfully"))
}

/// POST `/invoices/{invoice_id}/send` - Draft to sent.
async fn send_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<ApiResponse<InvoiceDetail>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let detail = repo
        .send_invoice(auth.user_id(), invoice_id, today())
        .await
        .inspect_err(|e| warn!(invoice_id = %invoice_id, error = %e, "Invoice send refused"))?;

    info!(invoice_id = %invoice_id, user_id = %auth.user_id(), "Invoice sent");
    Ok(ApiResponse::ok(detail).with_message("Invoice sent successfully"))
}

/// POST `/invoices/{invoice_id}/finalize` - Book the receivable, once.
async fn finalize_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<ApiResponse<PostedInvoice>, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let (invoice, transaction_id) = repo
        .finalize_invoice(auth.user_id(), invoice_id, today())
        .await
        .inspect_err(|e| warn!(invoice_id = %invoice_id, error = %e, "Finalize refused"))?;

    info!(
        invoice_id = %invoice_id,
        transaction_id = %transaction_id,
        user_id = %auth.user_id(),
        "Invoice finalized"
    );
    Ok(ApiResponse::ok(PostedInvoice {
        invoice,
        transaction_id,
    })
    .with_message("Invoice finalized and posted to the ledger"))
}

/// POST `/invoices/{invoice_id}/record-payment` - Book a cash receipt against the invoice.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<InvoiceId>,
    ValidatedJson(payload): ValidatedJson<RecordPaymentRequest>,
) -> Result<ApiResponse<PostedInvoice>, ApiError> {
    let payment = PaymentInput {
        amount: payload.amount,
        payment_date: payload.payment_date,
        method: PaymentMethod::parse(&payload.payment_method),
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    let (invoice, transaction_id) = repo
        .record_payment(auth.user_id(), invoice_id, payment, today())
        .await
        .inspect_err(|e| warn!(invoice_id = %invoice_id, error = %e, "Payment refused"))?;

    info!(
        invoice_id = %invoice_id,
        transaction_id = %transaction_id,
        amount = %payload.amount,
        user_id = %auth.user_id(),
        "Payment recorded"
    );
    Ok(ApiResponse::ok(PostedInvoice {
        invoice,
        transaction_id,
    })
    .with_message("Payment recorded successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(items: serde_json::Value) -> InvoiceRequest {
        serde_json::from_value(serde_json::json!({
            "invoice_number": " INV-001 ",
            "customer_name": "Acme",
            "customer_email": "billing@acme.test",
            "invoice_date": "2026-03-01",
            "due_date": "2026-03-31",
            "items": items,
        }))
        .unwrap()
    }

    #[test]
    fn test_request_maps_to_input() {
        let input: InvoiceInput = request(serde_json::json!([
            { "description": "Consulting", "quantity": "2", "unit_price": "150.00" }
        ]))
        .into();

        assert_eq!(input.invoice_number, "INV-001");
        assert_eq!(input.lines.len(), 1);
        assert_eq!(input.lines[0].quantity, dec!(2));
        assert_eq!(input.lines[0].account_id, None);
    }

    #[test]
    fn test_payment_amount_must_be_whole_positive_cents() {
        let payment = |amount: &str| -> RecordPaymentRequest {
            serde_json::from_value(serde_json::json!({
                "amount": amount,
                "payment_date": "2026-03-10",
                "payment_method": "cash",
            }))
            .unwrap()
        };

        assert!(payment("100.00").validate().is_ok());
        for amount in ["0", "-5", "10.005"] {
            let errors = payment(amount).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("amount"), "{amount}");
        }
    }

    #[test]
    fn test_empty_items_fail_validation() {
        let errors = request(serde_json::json!([])).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn test_bad_email_fails_validation() {
        let mut invoice = request(serde_json::json!([
            { "description": "Consulting", "quantity": "1", "unit_price": "10" }
        ]));
        invoice.customer_email = Some("not-an-email".into());
        let errors = invoice.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("customer_email"));
    }
}
