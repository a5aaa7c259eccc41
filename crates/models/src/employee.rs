use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub shift_start: Option<Time>,
    pub shift_end: Option<Time>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when creating an employee.
#[derive(Clone, Debug, Default)]
pub struct NewEmployee {
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub shift_start: Option<Time>,
    pub shift_end: Option<Time>,
    pub active: bool,
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::invalid("employee name required")); }
    if name.chars().count() > 128 { return Err(errors::ModelError::invalid("employee name too long (<=128)")); }
    Ok(())
}

/// A work schedule is either absent or a full `start < end` pair.
pub fn validate_shift(start: Option<Time>, end: Option<Time>) -> Result<(), errors::ModelError> {
    match (start, end) {
        (None, None) => Ok(()),
        (Some(s), Some(e)) if s < e => Ok(()),
        (Some(_), Some(_)) => Err(errors::ModelError::invalid("shift_start must be before shift_end")),
        _ => Err(errors::ModelError::invalid("shift_start and shift_end must be given together")),
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewEmployee) -> Result<Model, errors::ModelError> {
    validate_name(&input.name)?;
    validate_shift(input.shift_start, input.shift_end)?;
    if let Some(email) = input.email.as_deref() {
        crate::user::validate_email(email)?;
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        email: Set(input.email),
        role: Set(input.role),
        shift_start: Set(input.shift_start),
        shift_end: Set(input.shift_end),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}
