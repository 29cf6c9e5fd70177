//! `SeaORM` Entity for periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::dimensions::PeriodRecord;
use tally_shared::types::PeriodId;

use super::sea_orm_active_enums::PeriodStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: PeriodStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for PeriodRecord {
    fn from(model: &Model) -> Self {
        Self {
            id: PeriodId::from_uuid(model.id),
            name: model.name.clone(),
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status.into(),
        }
    }
}
