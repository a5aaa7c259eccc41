use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service_order;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_day")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_order_id: Uuid,
    pub day: Date,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceOrder }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceOrder => Entity::belongs_to(service_order::Entity).from(Column::ServiceOrderId).to(service_order::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
