//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::invoicing::InvoiceSnapshot;
use tally_shared::types::TransactionId;

use super::sea_orm_active_enums::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub invoice_date: Date,
    pub due_date: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub paid_amount: Decimal,
    pub status: InvoiceStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub transaction_id: Option<Uuid>,
    pub payment_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    InvoiceItems,
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_delete = "SetNull"
    )]
    Transactions,
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for InvoiceSnapshot {
    fn from(model: &Model) -> Self {
        Self {
            invoice_number: model.invoice_number.clone(),
            invoice_date: model.invoice_date,
            due_date: model.due_date,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            status: model.status.into(),
            transaction_id: model.transaction_id.map(TransactionId::from_uuid),
        }
    }
}
