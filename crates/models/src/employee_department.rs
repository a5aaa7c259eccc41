use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{department, employee, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_department")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub department_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Employee, Department }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Employee => Entity::belongs_to(employee::Entity).from(Column::EmployeeId).to(employee::Column::Id).into(),
            Relation::Department => Entity::belongs_to(department::Entity).from(Column::DepartmentId).to(department::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Replace the department set of an employee.
pub async fn replace_for_employee<C: ConnectionTrait>(
    db: &C,
    employee_id: Uuid,
    department_ids: &[Uuid],
) -> Result<(), errors::ModelError> {
    Entity::delete_many()
        .filter(Column::EmployeeId.eq(employee_id))
        .exec(db)
        .await?;
    if department_ids.is_empty() {
        return Ok(());
    }
    let rows = department_ids.iter().map(|d| ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(employee_id),
        department_id: Set(*d),
    });
    Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

pub async fn department_ids_of<C: ConnectionTrait>(db: &C, employee_id: Uuid) -> Result<Vec<Uuid>, errors::ModelError> {
    let rows = Entity::find()
        .filter(Column::EmployeeId.eq(employee_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.department_id).collect())
}
