//! Financial report generation.
//!
//! Pure aggregation over ledger line items:
//! - Trial Balance
//! - General Ledger (running balance per account)
//! - GL Summary (net balance per account and per type)

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
