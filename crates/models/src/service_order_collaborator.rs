use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{department, employee, service_order};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_order_collaborator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_order_id: Uuid,
    pub department_id: Uuid,
    pub employee_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceOrder, Department, Employee }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceOrder => Entity::belongs_to(service_order::Entity).from(Column::ServiceOrderId).to(service_order::Column::Id).into(),
            Relation::Department => Entity::belongs_to(department::Entity).from(Column::DepartmentId).to(department::Column::Id).into(),
            Relation::Employee => Entity::belongs_to(employee::Entity).from(Column::EmployeeId).to(employee::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
