//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Each one owns its atomic units of work.

pub mod account;
pub mod dimension;
pub mod invoice;
pub mod period;
pub mod report;
pub mod settings;
pub mod transaction;

pub use account::{
    AccountDetail, AccountFilter, AccountRepoError, AccountRepository, CreateAccountInput,
    UpdateAccountInput,
};
pub use dimension::{
    DepartmentDetail, DepartmentInput, DimensionFilter, DimensionRepoError, DimensionRepository,
    ProjectDetail, ProjectInput, SubsidiaryAccountDetail, SubsidiaryAccountInput,
};
pub use invoice::{InvoiceDetail, InvoiceFilter, InvoiceInput, InvoiceRepoError, InvoiceRepository};
pub use period::{PeriodInput, PeriodRepoError, PeriodRepository};
pub use report::{ReportRepoError, ReportRepository};
pub use settings::{GlAccounts, SettingsError, SettingsRepository};
pub use transaction::{
    CreateTransactionInput, ItemAccount, ItemWithAccount, MetadataPatch, TransactionDetail,
    TransactionFilter, TransactionMetadata, TransactionRepoError, TransactionRepository,
    UpdateTransactionInput,
};
