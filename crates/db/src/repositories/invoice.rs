//! Invoice repository.
//!
//! Invoices belong to the user who created them. Finalize and payment write
//! the generated journal entry and the invoice update in one database
//! transaction, with the invoice row locked for the duration.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;
use tally_core::dimensions::DimensionError;
use tally_core::invoicing::{
    AgingBucket, AgingSummary, InvoiceBridge, InvoiceError, InvoiceLine, InvoiceService,
    InvoiceSnapshot, InvoiceStatus as DomainStatus, PaymentInput,
};
use tally_shared::types::{
    InvoiceId, PageRequest, PageResponse, SortOrder, TransactionId, UserId, whitelisted_sort,
};
use uuid::Uuid;

use super::account::{load_records, sea_order};
use super::period::ensure_bookable;
use super::settings::{AR_KEY, account_setting};
use super::transaction::{insert_posting, reference_taken};
use crate::entities::sea_orm_active_enums::InvoiceStatus;
use crate::entities::{invoice_items, invoices};

/// Columns a client may sort invoices by.
pub const INVOICE_SORT_COLUMNS: [&str; 6] = [
    "invoice_number",
    "customer_name",
    "invoice_date",
    "due_date",
    "total_amount",
    "status",
];

/// Default page size of the invoice list.
pub const INVOICE_PAGE_SIZE: u64 = 15;

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceRepoError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(InvoiceId),

    /// Invoice belongs to another user.
    #[error("You do not have access to this invoice")]
    Forbidden(InvoiceId),

    /// Invoice number already used.
    #[error("The invoice number '{0}' has already been taken")]
    DuplicateNumber(String),

    /// The generated transaction reference is already used.
    #[error("The reference '{0}' has already been taken")]
    DuplicateReference(String),

    /// Invoice rule violated.
    #[error(transparent)]
    Rule(#[from] InvoiceError),

    /// The posting date falls in a closed period.
    #[error(transparent)]
    Period(#[from] DimensionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Invoice body for create and update.
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    /// Unique invoice number.
    pub invoice_number: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer e-mail.
    pub customer_email: Option<String>,
    /// Customer phone.
    pub customer_phone: Option<String>,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Due date, not before the issue date.
    pub due_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// Complete line set.
    pub lines: Vec<InvoiceLine>,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Case-insensitive match on customer name.
    pub customer_name: Option<String>,
    /// Filter by status.
    pub status: Option<DomainStatus>,
    /// Earliest invoice date (inclusive).
    pub from_date: Option<NaiveDate>,
    /// Latest invoice date (inclusive).
    pub to_date: Option<NaiveDate>,
    /// Requested sort column, checked against [`INVOICE_SORT_COLUMNS`].
    pub sort_by: Option<String>,
    /// Requested sort direction.
    pub sort_order: Option<String>,
}

/// An invoice with its lines and derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    /// Invoice header.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Total minus paid.
    pub balance: Decimal,
    /// Past due and not paid.
    pub is_overdue: bool,
    /// Days past due, zero when not overdue.
    pub days_overdue: i64,
    /// Age band.
    pub aging_bucket: AgingBucket,
    /// Lines in insertion order.
    pub items: Vec<invoice_items::Model>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the caller's invoices.
    ///
    /// Without a recognized sort column the newest invoice date comes first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        user_id: UserId,
        filter: InvoiceFilter,
        page: PageRequest,
    ) -> Result<PageResponse<invoices::Model>, InvoiceRepoError> {
        let mut query =
            invoices::Entity::find().filter(invoices::Column::UserId.eq(user_id.into_inner()));

        if let Some(name) = filter.customer_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(Expr::col(invoices::Column::CustomerName).ilike(format!("%{name}%")));
        }
        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(InvoiceStatus::from(status)));
        }
        if let Some(from) = filter.from_date {
            query = query.filter(invoices::Column::InvoiceDate.gte(from));
        }
        if let Some(to) = filter.to_date {
            query = query.filter(invoices::Column::InvoiceDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;

        let order = SortOrder::parse(filter.sort_order.as_deref(), SortOrder::Desc);
        query = match whitelisted_sort(filter.sort_by.as_deref(), &INVOICE_SORT_COLUMNS)
            .and_then(sort_column)
        {
            Some(column) => query.order_by(column, sea_order(order)),
            None => query
                .order_by_desc(invoices::Column::InvoiceDate)
                .order_by_desc(invoices::Column::CreatedAt),
        };

        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Finds one of the caller's invoices.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Forbidden`.
    pub async fn find_invoice(
        &self,
        user_id: UserId,
        id: InvoiceId,
        today: NaiveDate,
    ) -> Result<InvoiceDetail, InvoiceRepoError> {
        let invoice = invoices::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepoError::NotFound(id))?;
        ensure_owner(&invoice, user_id, id)?;
        Ok(load_detail(&self.db, invoice, today).await?)
    }

    /// Creates a draft invoice, computing line amounts and the total.
    ///
    /// # Errors
    ///
    /// Returns `Rule` for an invalid body and `DuplicateNumber`.
    pub async fn create_invoice(
        &self,
        user_id: UserId,
        input: InvoiceInput,
        today: NaiveDate,
    ) -> Result<InvoiceDetail, InvoiceRepoError> {
        InvoiceService::validate_draft(input.invoice_date, input.due_date, &input.lines)?;

        let txn = self.db.begin().await?;
        if number_taken(&txn, &input.invoice_number, None).await? {
            return Err(InvoiceRepoError::DuplicateNumber(input.invoice_number));
        }

        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(InvoiceId::new().into_inner()),
            user_id: Set(user_id.into_inner()),
            invoice_number: Set(input.invoice_number),
            customer_name: Set(input.customer_name),
            customer_email: Set(input.customer_email),
            customer_phone: Set(input.customer_phone),
            invoice_date: Set(input.invoice_date),
            due_date: Set(input.due_date),
            total_amount: Set(InvoiceService::total(&input.lines)),
            paid_amount: Set(Decimal::ZERO),
            status: Set(InvoiceStatus::Draft),
            notes: Set(input.notes),
            transaction_id: Set(None),
            payment_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        insert_lines(&txn, invoice.id, &input.lines).await?;
        let detail = load_detail(&txn, invoice, today).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Replaces a draft invoice's fields and lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden`, `Rule(NotDraft)` or a validation error.
    pub async fn update_invoice(
        &self,
        user_id: UserId,
        id: InvoiceId,
        input: InvoiceInput,
        today: NaiveDate,
    ) -> Result<InvoiceDetail, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = lock(&txn, user_id, id).await?;

        InvoiceService::ensure_draft(invoice.status.into(), "edit")?;
        InvoiceService::validate_draft(input.invoice_date, input.due_date, &input.lines)?;

        if input.invoice_number != invoice.invoice_number
            && number_taken(&txn, &input.invoice_number, Some(id)).await?
        {
            return Err(InvoiceRepoError::DuplicateNumber(input.invoice_number));
        }

        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
            .exec(&txn)
            .await?;
        insert_lines(&txn, invoice.id, &input.lines).await?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.invoice_number = Set(input.invoice_number);
        active.customer_name = Set(input.customer_name);
        active.customer_email = Set(input.customer_email);
        active.customer_phone = Set(input.customer_phone);
        active.invoice_date = Set(input.invoice_date);
        active.due_date = Set(input.due_date);
        active.notes = Set(input.notes);
        active.total_amount = Set(InvoiceService::total(&input.lines));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let detail = load_detail(&txn, updated, today).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Deletes a draft invoice and its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` or `Rule(NotDraft)`.
    pub async fn delete_invoice(&self, user_id: UserId, id: InvoiceId) -> Result<(), InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = lock(&txn, user_id, id).await?;

        InvoiceService::ensure_draft(invoice.status.into(), "delete")?;

        invoices::Entity::delete_by_id(invoice.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Marks a draft invoice as sent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` or `Rule(NotDraft)`.
    pub async fn send_invoice(
        &self,
        user_id: UserId,
        id: InvoiceId,
        today: NaiveDate,
    ) -> Result<InvoiceDetail, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = lock(&txn, user_id, id).await?;

        let status = InvoiceService::send(invoice.status.into())?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let detail = load_detail(&txn, updated, today).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Books an invoice: creates its journal entry and marks it unpaid.
    ///
    /// Returns the invoice and the generated transaction id.
    ///
    /// # Errors
    ///
    /// Returns `Rule(AlreadyFinalized)` on a second call, `Rule(Account)`
    /// when no receivable account resolves, and `DuplicateReference` if the
    /// generated reference is taken. Nothing is written on error.
    pub async fn finalize_invoice(
        &self,
        user_id: UserId,
        id: InvoiceId,
        today: NaiveDate,
    ) -> Result<(InvoiceDetail, TransactionId), InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = lock(&txn, user_id, id).await?;

        let lines: Vec<InvoiceLine> = load_lines(&txn, invoice.id)
            .await?
            .iter()
            .map(InvoiceLine::from)
            .collect();
        let receivable = account_setting(&txn, user_id, AR_KEY).await?;
        let accounts = load_records(&txn).await?;

        let plan = InvoiceBridge::plan_finalization(
            &InvoiceSnapshot::from(&invoice),
            &lines,
            receivable,
            &accounts,
        )?;

        if reference_taken(&txn, &plan.posting.reference, None).await? {
            return Err(InvoiceRepoError::DuplicateReference(plan.posting.reference));
        }
        ensure_bookable::<InvoiceRepoError, _>(&txn, plan.posting.transaction_date).await?;
        let transaction = insert_posting(&txn, user_id, &plan.posting).await?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.transaction_id = Set(Some(transaction.id));
        active.status = Set(plan.new_status.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let detail = load_detail(&txn, updated, today).await?;
        txn.commit().await?;
        Ok((detail, TransactionId::from_uuid(transaction.id)))
    }

    /// Records a payment: creates a cash receipt and updates the paid amount.
    ///
    /// Returns the invoice and the generated transaction id.
    ///
    /// # Errors
    ///
    /// Returns `Rule(PaymentExceedsBalance)` for an overpayment,
    /// `Rule(NotFinalized)` before finalize, and `Rule(Account)` when no AR
    /// or cash account resolves. Nothing is written on error.
    pub async fn record_payment(
        &self,
        user_id: UserId,
        id: InvoiceId,
        payment: PaymentInput,
        today: NaiveDate,
    ) -> Result<(InvoiceDetail, TransactionId), InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = lock(&txn, user_id, id).await?;

        let receivable = account_setting(&txn, user_id, AR_KEY).await?;
        let accounts = load_records(&txn).await?;
        let sequence = u64::try_from(invoice.payment_count).unwrap_or(0) + 1;

        let plan = InvoiceBridge::plan_payment(
            &InvoiceSnapshot::from(&invoice),
            &payment,
            sequence,
            receivable,
            &accounts,
        )?;

        if reference_taken(&txn, &plan.posting.reference, None).await? {
            return Err(InvoiceRepoError::DuplicateReference(plan.posting.reference));
        }
        ensure_bookable::<InvoiceRepoError, _>(&txn, plan.posting.transaction_date).await?;
        let transaction = insert_posting(&txn, user_id, &plan.posting).await?;

        let payment_count = invoice.payment_count.saturating_add(1);
        let mut active: invoices::ActiveModel = invoice.into();
        active.paid_amount = Set(plan.paid_amount);
        active.status = Set(plan.new_status.into());
        active.payment_count = Set(payment_count);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let detail = load_detail(&txn, updated, today).await?;
        txn.commit().await?;
        Ok((detail, TransactionId::from_uuid(transaction.id)))
    }

    /// Aging of the caller's open invoices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn aging(&self, user_id: UserId, today: NaiveDate) -> Result<AgingSummary, InvoiceRepoError> {
        let rows = invoices::Entity::find()
            .filter(invoices::Column::UserId.eq(user_id.into_inner()))
            .filter(invoices::Column::Status.ne(InvoiceStatus::Paid))
            .all(&self.db)
            .await?;
        let snapshots: Vec<InvoiceSnapshot> = rows.iter().map(InvoiceSnapshot::from).collect();
        Ok(InvoiceService::aging_summary(&snapshots, today))
    }
}

fn ensure_owner(
    invoice: &invoices::Model,
    user_id: UserId,
    id: InvoiceId,
) -> Result<(), InvoiceRepoError> {
    if invoice.user_id == user_id.into_inner() {
        Ok(())
    } else {
        Err(InvoiceRepoError::Forbidden(id))
    }
}

async fn lock(
    txn: &DatabaseTransaction,
    user_id: UserId,
    id: InvoiceId,
) -> Result<invoices::Model, InvoiceRepoError> {
    let invoice = invoices::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(InvoiceRepoError::NotFound(id))?;
    ensure_owner(&invoice, user_id, id)?;
    Ok(invoice)
}

async fn number_taken<C: ConnectionTrait>(
    conn: &C,
    number: &str,
    except: Option<InvoiceId>,
) -> Result<bool, DbErr> {
    let mut query = invoices::Entity::find().filter(invoices::Column::InvoiceNumber.eq(number));
    if let Some(id) = except {
        query = query.filter(invoices::Column::Id.ne(id.into_inner()));
    }
    Ok(query.count(conn).await? > 0)
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    lines: &[InvoiceLine],
) -> Result<(), DbErr> {
    let now = Utc::now().into();
    for line in lines {
        invoice_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(invoice_id),
            description: Set(line.description.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            amount: Set(InvoiceService::line_amount(line)),
            account_id: Set(line.account_id.map(|id| id.into_inner())),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
) -> Result<Vec<invoice_items::Model>, DbErr> {
    invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_items::Column::CreatedAt)
        .order_by_asc(invoice_items::Column::Id)
        .all(conn)
        .await
}

async fn load_detail<C: ConnectionTrait>(
    conn: &C,
    invoice: invoices::Model,
    today: NaiveDate,
) -> Result<InvoiceDetail, DbErr> {
    let items = load_lines(conn, invoice.id).await?;
    Ok(derive_detail(invoice, items, today))
}

fn derive_detail(
    invoice: invoices::Model,
    items: Vec<invoice_items::Model>,
    today: NaiveDate,
) -> InvoiceDetail {
    let snapshot = InvoiceSnapshot::from(&invoice);
    InvoiceDetail {
        balance: InvoiceService::balance(&snapshot),
        is_overdue: InvoiceService::is_overdue(&snapshot, today),
        days_overdue: InvoiceService::days_overdue(&snapshot, today),
        aging_bucket: InvoiceService::aging_bucket(&snapshot, today),
        invoice,
        items,
    }
}

fn sort_column(name: &str) -> Option<invoices::Column> {
    match name {
        "invoice_number" => Some(invoices::Column::InvoiceNumber),
        "customer_name" => Some(invoices::Column::CustomerName),
        "invoice_date" => Some(invoices::Column::InvoiceDate),
        "due_date" => Some(invoices::Column::DueDate),
        "total_amount" => Some(invoices::Column::TotalAmount),
        "status" => Some(invoices::Column::Status),
        _ => None,
    }
}
