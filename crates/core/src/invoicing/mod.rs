//! Invoices and their bridge to the ledger.
//!
//! - `types` - invoice status, snapshot, lines, aging buckets
//! - `service` - totals, status gates, balance, overdue and aging
//! - `bridge` - postings generated by finalize and record-payment
//! - `error` - invoice errors

pub mod bridge;
pub mod error;
pub mod service;
pub mod types;

pub use bridge::{FinalizationPlan, InvoiceBridge, PaymentInput, PaymentPlan, PostingPlan};
pub use error::InvoiceError;
pub use service::{AgingSummary, InvoiceService};
pub use types::{AgingBucket, InvoiceLine, InvoiceSnapshot, InvoiceStatus};
