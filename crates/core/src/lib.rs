//! Core business logic for Tally.
//!
//! This crate contains pure business logic with no web or database
//! dependencies. Repositories load plain records, call into these services
//! and persist whatever they return.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts, type normalization, AR/cash resolution
//! - `dimensions` - Departments, projects, subsidiary accounts, periods
//! - `ledger` - Double-entry validation of line item sets
//! - `workflow` - Transaction status state machine
//! - `invoicing` - Invoice rules and the invoice-to-ledger bridge
//! - `reports` - Trial balance, general ledger, GL summary
//! - `storage` - Attachment blobs

pub mod accounts;
pub mod dimensions;
pub mod invoicing;
pub mod ledger;
pub mod reports;
pub mod storage;
pub mod workflow;
