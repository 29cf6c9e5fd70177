//! Double-entry bookkeeping logic.
//!
//! This module implements the ledger entry validator:
//! - Domain types for line items and totals
//! - Error types for entry validation
//! - Ledger service enforcing amount, account and balance rules

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{AccountStatus, DimensionTags, EntryTotals, EntryType, LineItemInput};
