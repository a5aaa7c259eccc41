use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{department, errors, service_order};

/// Execution window of one department inside a service order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_order_department")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_order_id: Uuid,
    pub department_id: Uuid,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceOrder, Department }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceOrder => Entity::belongs_to(service_order::Entity).from(Column::ServiceOrderId).to(service_order::Column::Id).into(),
            Relation::Department => Entity::belongs_to(department::Entity).from(Column::DepartmentId).to(department::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_window(start: &DateTimeWithTimeZone, end: &DateTimeWithTimeZone) -> Result<(), errors::ModelError> {
    if start >= end {
        return Err(errors::ModelError::invalid("start_at must be before end_at"));
    }
    Ok(())
}
