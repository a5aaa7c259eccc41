use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "department")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    /// Position along the production line, 1 = first.
    pub production_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::invalid("department name required")); }
    if name.chars().count() > 128 { return Err(errors::ModelError::invalid("department name too long (<=128)")); }
    Ok(())
}

pub fn validate_production_order(order: i32) -> Result<(), errors::ModelError> {
    if order < 1 {
        return Err(errors::ModelError::invalid("production_order must be >= 1"));
    }
    Ok(())
}

/// Highest ranking in use, 0 when there are no departments.
pub async fn max_production_order<C: ConnectionTrait>(db: &C) -> Result<i32, errors::ModelError> {
    let top = Entity::find()
        .order_by_desc(Column::ProductionOrder)
        .limit(1)
        .one(db)
        .await?;
    Ok(top.map(|d| d.production_order).unwrap_or(0))
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<&str>,
    production_order: i32,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    validate_production_order(production_order)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        description: Set(description.map(str::to_string)),
        production_order: Set(production_order),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_order_must_be_positive() {
        assert!(validate_production_order(1).is_ok());
        assert!(validate_production_order(0).is_err());
        assert!(validate_production_order(-3).is_err());
    }

    #[test]
    fn name_is_required() {
        assert!(validate_name("Cutting").is_ok());
        assert!(validate_name("").is_err());
    }
}
