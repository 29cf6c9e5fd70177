//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod departments;
pub mod invoice_items;
pub mod invoices;
pub mod periods;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod settings;
pub mod subsidiary_accounts;
pub mod transaction_items;
pub mod transactions;
