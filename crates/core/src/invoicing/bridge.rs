//! Invoice-to-ledger bridge.
//!
//! Turns invoice actions into balanced postings:
//! - finalize: debit AR for the total, credit each line's revenue account
//! - payment: debit the cash-equivalent account, credit AR
//!
//! The bridge only plans. Persisting the plan together with the invoice
//! update is the caller's single atomic unit of work.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::InvoiceError;
use super::service::InvoiceService;
use super::types::{InvoiceLine, InvoiceSnapshot, InvoiceStatus};
use crate::accounts::{AccountRecord, AccountService, PaymentMethod};
use crate::ledger::{AccountStatus, LedgerService, LineItemInput};
use crate::workflow::{TransactionStatus, TransactionType};

/// A transaction to be written, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPlan {
    /// Unique reference.
    pub reference: String,
    /// Short description.
    pub description: String,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Initial status.
    pub status: TransactionStatus,
    /// Booking date.
    pub transaction_date: NaiveDate,
    /// Declared amount.
    pub amount: Decimal,
    /// Notes.
    pub notes: String,
    /// Balanced line items.
    pub items: Vec<LineItemInput>,
}

/// Outcome of finalizing an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizationPlan {
    /// Journal entry to create.
    pub posting: PostingPlan,
    /// Status the invoice moves to.
    pub new_status: InvoiceStatus,
}

/// Outcome of recording a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    /// Cash receipt to create.
    pub posting: PostingPlan,
    /// Paid amount after this payment.
    pub paid_amount: Decimal,
    /// Status the invoice moves to.
    pub new_status: InvoiceStatus,
}

/// A payment as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInput {
    /// Amount received.
    pub amount: Decimal,
    /// Date received.
    pub payment_date: NaiveDate,
    /// How it was received.
    pub method: PaymentMethod,
}

/// Stateless planner for invoice postings.
pub struct InvoiceBridge;

impl InvoiceBridge {
    /// Plan the journal entry for an invoice.
    ///
    /// # Arguments
    ///
    /// * `invoice` - The invoice being finalized
    /// * `lines` - Its lines; each must name a revenue account
    /// * `configured_receivable` - The caller's `ar_account_id` setting, if any
    /// * `accounts` - The chart of accounts
    ///
    /// # Errors
    ///
    /// Returns `AlreadyFinalized` if a transaction is already linked,
    /// `Account` if no AR account resolves, and `Ledger` if the entry does
    /// not validate (including lines without a revenue account).
    pub fn plan_finalization(
        invoice: &InvoiceSnapshot,
        lines: &[InvoiceLine],
        configured_receivable: Option<AccountId>,
        accounts: &[AccountRecord],
    ) -> Result<FinalizationPlan, InvoiceError> {
        if invoice.transaction_id.is_some() {
            return Err(InvoiceError::AlreadyFinalized);
        }

        let receivable = AccountService::resolve_receivable(configured_receivable, accounts)?;

        let mut items = Vec::with_capacity(lines.len() + 1);
        items.push(LineItemInput::debit(receivable, invoice.total_amount));
        for (index, line) in lines.iter().enumerate() {
            let amount = InvoiceService::line_amount(line);
            if amount.is_zero() {
                continue;
            }
            let account_id = line.account_id.ok_or(InvoiceError::InvalidLine {
                index,
                reason: "revenue account is required to finalize",
            })?;
            let mut item = LineItemInput::credit(account_id, amount);
            item.description = Some(line.description.clone());
            items.push(item);
        }

        LedgerService::validate_entry(&items, Self::lookup(accounts))?;

        Ok(FinalizationPlan {
            posting: PostingPlan {
                reference: format!("INV-{}", invoice.invoice_number),
                description: format!("Invoice: {}", invoice.invoice_number),
                transaction_type: TransactionType::Journal,
                status: TransactionStatus::Approved,
                transaction_date: invoice.invoice_date,
                amount: invoice.total_amount,
                notes: "Generated from invoice".to_string(),
                items,
            },
            new_status: InvoiceStatus::Unpaid,
        })
    }

    /// Plan the cash receipt for a payment.
    ///
    /// `sequence` numbers payments on the same invoice from 1, keeping each
    /// generated reference unique.
    ///
    /// # Errors
    ///
    /// Returns `NotFinalized` for an invoice without a booked transaction,
    /// `InvalidPaymentAmount` or `PaymentExceedsBalance` for a bad amount,
    /// and `Account` if no AR or cash account resolves.
    pub fn plan_payment(
        invoice: &InvoiceSnapshot,
        payment: &PaymentInput,
        sequence: u64,
        configured_receivable: Option<AccountId>,
        accounts: &[AccountRecord],
    ) -> Result<PaymentPlan, InvoiceError> {
        if invoice.transaction_id.is_none() {
            return Err(InvoiceError::NotFinalized);
        }
        if payment.amount <= Decimal::ZERO {
            return Err(InvoiceError::InvalidPaymentAmount);
        }
        let balance = InvoiceService::balance(invoice);
        if payment.amount > balance {
            return Err(InvoiceError::PaymentExceedsBalance {
                amount: payment.amount,
                balance,
            });
        }

        let receivable = AccountService::resolve_receivable(configured_receivable, accounts)?;
        let cash = AccountService::resolve_cash(&payment.method, accounts)?;

        let items = vec![
            LineItemInput::debit(cash, payment.amount),
            LineItemInput::credit(receivable, payment.amount),
        ];
        LedgerService::validate_entry(&items, Self::lookup(accounts))?;

        let paid_amount = invoice.paid_amount + payment.amount;
        let new_status = if paid_amount >= invoice.total_amount {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        };

        Ok(PaymentPlan {
            posting: PostingPlan {
                reference: format!("PAYMENT-{}-{sequence}", invoice.invoice_number),
                description: format!("Payment for invoice: {}", invoice.invoice_number),
                transaction_type: TransactionType::CashReceipt,
                status: TransactionStatus::Approved,
                transaction_date: payment.payment_date,
                amount: payment.amount,
                notes: format!("Payment method: {}", payment.method.as_str()),
                items,
            },
            paid_amount,
            new_status,
        })
    }

    fn lookup(accounts: &[AccountRecord]) -> impl Fn(AccountId) -> Option<AccountStatus> + '_ {
        |id| {
            accounts.iter().find(|a| a.id == id).map(|a| AccountStatus {
                is_active: a.is_active,
            })
        }
    }
}
