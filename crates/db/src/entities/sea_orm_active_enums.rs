//! `SeaORM` active enums mapped to Postgres enum types.
//!
//! Each enum converts losslessly to and from its domain counterpart in
//! `tally-core`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::dimensions::{
    DimensionStatus as DomainDimensionStatus, PeriodStatus as DomainPeriodStatus,
    ProjectStatus as DomainProjectStatus, SubsidiaryType as DomainSubsidiaryType,
};
use tally_core::invoicing::InvoiceStatus as DomainInvoiceStatus;
use tally_core::ledger::EntryType as DomainEntryType;
use tally_core::workflow::{
    TransactionStatus as DomainTransactionStatus, TransactionType as DomainTransactionType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "journal")]
    Journal,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "cash_receipt")]
    CashReceipt,
    #[sea_orm(string_value = "gcash")]
    Gcash,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "check_disbursement")]
    CheckDisbursement,
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    #[sea_orm(string_value = "debit_card")]
    DebitCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "dimension_status")]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "project_status")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "planning")]
    Planning,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "subsidiary_type")]
#[serde(rename_all = "snake_case")]
pub enum SubsidiaryType {
    #[sea_orm(string_value = "cost_center")]
    CostCenter,
    #[sea_orm(string_value = "profit_center")]
    ProfitCenter,
    #[sea_orm(string_value = "branch")]
    Branch,
    #[sea_orm(string_value = "division")]
    Division,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "locked")]
    Locked,
}

/// Generates `From` impls in both directions between a column enum and its
/// domain enum with identically named variants.
macro_rules! mirror_enum {
    ($db:ident <=> $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(TransactionStatus <=> DomainTransactionStatus {
    Draft, Pending, Approved, Rejected
});

mirror_enum!(TransactionType <=> DomainTransactionType {
    Receipt, Payment, Journal, Transfer, CashReceipt, Gcash, BankTransfer, Check,
    CheckDisbursement, CreditCard, DebitCard
});

mirror_enum!(EntryType <=> DomainEntryType { Debit, Credit });

mirror_enum!(InvoiceStatus <=> DomainInvoiceStatus {
    Draft, Sent, Unpaid, PartiallyPaid, Paid, Overdue
});

mirror_enum!(DimensionStatus <=> DomainDimensionStatus { Active, Inactive });

mirror_enum!(ProjectStatus <=> DomainProjectStatus {
    Planning, Active, Paused, Completed, Cancelled
});

mirror_enum!(SubsidiaryType <=> DomainSubsidiaryType {
    CostCenter, ProfitCenter, Branch, Division, Custom
});

mirror_enum!(PeriodStatus <=> DomainPeriodStatus { Open, Closed, Locked });

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_status_round_trip() {
        for status in DomainTransactionStatus::ALL {
            let column: TransactionStatus = status.into();
            assert_eq!(DomainTransactionStatus::from(column), status);
        }
    }

    #[test]
    fn test_string_values_match_domain() {
        for column in TransactionType::iter() {
            let domain = DomainTransactionType::from(column);
            assert_eq!(column.to_value(), domain.as_str());
        }
        for column in InvoiceStatus::iter() {
            let domain = DomainInvoiceStatus::from(column);
            assert_eq!(column.to_value(), domain.as_str());
        }
        for column in ProjectStatus::iter() {
            assert_eq!(column.to_value(), DomainProjectStatus::from(column).as_str());
        }
        for column in SubsidiaryType::iter() {
            assert_eq!(column.to_value(), DomainSubsidiaryType::from(column).as_str());
        }
        for column in PeriodStatus::iter() {
            assert_eq!(column.to_value(), DomainPeriodStatus::from(column).as_str());
        }
    }
}
