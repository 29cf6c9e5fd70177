//! Chart of accounts.
//!
//! - `types` - account types and the account record
//! - `tree` - parent/child index and nested hierarchy
//! - `service` - deletion guard, AR and cash account resolution
//! - `error` - account errors

pub mod error;
pub mod service;
pub mod tree;
pub mod types;

pub use error::AccountError;
pub use service::{AccountService, PaymentMethod};
pub use tree::{AccountNode, ChartOfAccounts};
pub use types::{AccountRecord, AccountType};
