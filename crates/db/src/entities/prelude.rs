//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::departments::Entity as Departments;
pub use super::invoice_items::Entity as InvoiceItems;
pub use super::invoices::Entity as Invoices;
pub use super::periods::Entity as Periods;
pub use super::projects::Entity as Projects;
pub use super::settings::Entity as Settings;
pub use super::subsidiary_accounts::Entity as SubsidiaryAccounts;
pub use super::transaction_items::Entity as TransactionItems;
pub use super::transactions::Entity as Transactions;
